//! Interpolation of data given on regular rectilinear grids.
use crate::error::{Error, Result};
use fenics_ice_traits::Real;
use nalgebra::{DMatrix, Point2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridInterpolationMethod {
    /// Bilinear interpolation in the enclosing grid cell.
    #[default]
    Linear,
    /// Value of the nearest grid node, chosen independently per axis.
    Nearest,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised interpolation method `{0}`, expected `linear` or `nearest`")]
pub struct UnknownInterpolationMethod(pub String);

impl FromStr for GridInterpolationMethod {
    type Err = UnknownInterpolationMethod;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "nearest" => Ok(Self::Nearest),
            _ => Err(UnknownInterpolationMethod(s.to_string())),
        }
    }
}

impl fmt::Display for GridInterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridInterpolationOptions<T> {
    pub method: GridInterpolationMethod,
    pub min_val: Option<T>,
    pub max_val: Option<T>,
    /// Extrapolate from the nearest boundary cell instead of failing for points outside the grid.
    ///
    /// Extrapolation is also enabled whenever `min_val` or `max_val` is given.
    pub allow_extrapolation: bool,
}

impl<T> Default for GridInterpolationOptions<T> {
    fn default() -> Self {
        Self {
            method: GridInterpolationMethod::default(),
            min_val: None,
            max_val: None,
            allow_extrapolation: false,
        }
    }
}

impl<T> GridInterpolationOptions<T> {
    pub fn with_method(self, method: GridInterpolationMethod) -> Self {
        Self { method, ..self }
    }

    pub fn with_bounds(self, min_val: Option<T>, max_val: Option<T>) -> Self {
        Self {
            min_val,
            max_val,
            ..self
        }
    }

    pub fn with_extrapolation(self, allow_extrapolation: bool) -> Self {
        Self {
            allow_extrapolation,
            ..self
        }
    }

    fn extrapolates(&self) -> bool {
        self.allow_extrapolation || self.min_val.is_some() || self.max_val.is_some()
    }
}

/// Scalar values on the nodes of a rectilinear grid with strictly increasing axes.
///
/// `values[(i, j)]` is the value at `(x[i], y[j])`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularGrid2d<T: Real> {
    x: Vec<T>,
    y: Vec<T>,
    values: DMatrix<T>,
}

fn is_strictly_increasing<T: Real>(axis: &[T]) -> bool {
    axis.windows(2).all(|w| w[0] < w[1])
}

fn to_f64<T: Real>(x: T) -> f64 {
    x.to_subset().unwrap_or(f64::NAN)
}

impl<T: Real> RegularGrid2d<T> {
    pub fn try_new(x: Vec<T>, y: Vec<T>, values: DMatrix<T>) -> Result<Self> {
        if x.is_empty() || y.is_empty() {
            return Err(Error::InvalidGrid("grid axes must not be empty".to_string()));
        }
        for (name, axis) in [("x", &x), ("y", &y)] {
            if !axis.iter().all(|v| v.is_finite()) {
                return Err(Error::InvalidGrid(format!("{name} axis has non-finite coordinates")));
            }
            if !is_strictly_increasing(axis) {
                return Err(Error::InvalidGrid(format!("{name} axis is not strictly increasing")));
            }
        }
        if values.shape() != (x.len(), y.len()) {
            return Err(Error::InvalidGrid(format!(
                "values have shape {:?}, expected ({}, {})",
                values.shape(),
                x.len(),
                y.len()
            )));
        }
        Ok(Self { x, y, values })
    }

    pub fn x(&self) -> &[T] {
        &self.x
    }

    pub fn y(&self) -> &[T] {
        &self.y
    }

    pub fn values(&self) -> &DMatrix<T> {
        &self.values
    }

    /// `[x_min, x_max, y_min, y_max]`.
    pub fn domain(&self) -> [T; 4] {
        [self.x[0], self.x[self.x.len() - 1], self.y[0], self.y[self.y.len() - 1]]
    }

    /// Whether both axes have constant spacing up to the given relative tolerance.
    pub fn is_uniformly_spaced(&self, rel_tol: T) -> bool {
        let is_uniform = |axis: &[T]| {
            let Some(&first) = axis.first() else { return true };
            let Some(&last) = axis.last() else { return true };
            if axis.len() < 3 {
                return true;
            }
            let spacing = (last - first) / T::from_usize(axis.len() - 1).expect("usize must fit in T");
            axis.windows(2)
                .all(|w| ((w[1] - w[0]) - spacing).abs() <= rel_tol * spacing.abs())
        };
        is_uniform(&self.x) && is_uniform(&self.y)
    }

    pub fn interpolate(&self, targets: &[Point2<T>], options: &GridInterpolationOptions<T>) -> Result<Vec<T>> {
        if options.method == GridInterpolationMethod::Linear && (self.x.len() < 2 || self.y.len() < 2) {
            return Err(Error::InvalidGrid(format!(
                "linear interpolation requires at least 2 nodes per axis, grid has {} x {}",
                self.x.len(),
                self.y.len()
            )));
        }

        targets
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let inside = self.contains(p);
                if !inside && !(p.x.is_finite() && p.y.is_finite() && options.extrapolates()) {
                    return Err(self.out_of_domain(index, p));
                }
                let value = match options.method {
                    GridInterpolationMethod::Linear => self.bilinear(p),
                    GridInterpolationMethod::Nearest => self.nearest(p),
                };
                Ok(clip(value, options.min_val, options.max_val))
            })
            .collect()
    }

    fn contains(&self, p: &Point2<T>) -> bool {
        let [x_min, x_max, y_min, y_max] = self.domain();
        p.x >= x_min && p.x <= x_max && p.y >= y_min && p.y <= y_max
    }

    fn out_of_domain(&self, index: usize, p: &Point2<T>) -> Error {
        let [x_min, x_max, y_min, y_max] = self.domain().map(to_f64);
        Error::OutOfDomain {
            index,
            x: to_f64(p.x),
            y: to_f64(p.y),
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    fn bilinear(&self, p: &Point2<T>) -> T {
        let (i, tx) = cell_coordinate(&self.x, p.x);
        let (j, ty) = cell_coordinate(&self.y, p.y);
        let v = &self.values;
        let one = T::one();
        v[(i, j)] * (one - tx) * (one - ty)
            + v[(i + 1, j)] * tx * (one - ty)
            + v[(i, j + 1)] * (one - tx) * ty
            + v[(i + 1, j + 1)] * tx * ty
    }

    fn nearest(&self, p: &Point2<T>) -> T {
        self.values[(nearest_node(&self.x, p.x), nearest_node(&self.y, p.y))]
    }
}

/// Index `i` of the cell `[axis[i], axis[i + 1]]` used for `x`, and the local coordinate of `x` in it.
///
/// Points beyond the ends of the axis use the boundary cell, which gives local coordinates
/// outside `[0, 1]`. Requires at least two nodes.
fn cell_coordinate<T: Real>(axis: &[T], x: T) -> (usize, T) {
    let i = axis
        .partition_point(|&node| node <= x)
        .saturating_sub(1)
        .min(axis.len() - 2);
    let t = (x - axis[i]) / (axis[i + 1] - axis[i]);
    (i, t)
}

/// Index of the node closest to `x`. Exact midpoints go to the lower node.
fn nearest_node<T: Real>(axis: &[T], x: T) -> usize {
    if axis.len() == 1 {
        return 0;
    }
    let (i, _) = cell_coordinate(axis, x);
    if x - axis[i] <= axis[i + 1] - x {
        i
    } else {
        i + 1
    }
}

fn clip<T: Real>(value: T, min_val: Option<T>, max_val: Option<T>) -> T {
    let value = min_val.map_or(value, |min| value.max(min));
    max_val.map_or(value, |max| value.min(max))
}

/// Interpolates gridded values at the target points.
///
/// `values` must have shape `(grid_x.len(), grid_y.len())`.
pub fn interpolate_grid<T: Real>(
    grid_x: &[T],
    grid_y: &[T],
    values: &DMatrix<T>,
    targets: &[Point2<T>],
    options: &GridInterpolationOptions<T>,
) -> Result<Vec<T>> {
    RegularGrid2d::try_new(grid_x.to_vec(), grid_y.to_vec(), values.clone())?.interpolate(targets, options)
}
