use crate::error::{Error, Result};
use nalgebra::{Point2, Scalar};
use std::collections::BTreeMap;

/// Scattered 2D points with named scalar arrays aligned by point index.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatteredPointSet<T: Scalar> {
    points: Vec<Point2<T>>,
    values: BTreeMap<String, Vec<T>>,
}

impl<T: Scalar> ScatteredPointSet<T> {
    pub fn from_points(points: Vec<Point2<T>>) -> Self {
        Self {
            points,
            values: BTreeMap::new(),
        }
    }

    /// Pairs up separate coordinate arrays.
    pub fn from_coordinates(x: &[T], y: &[T]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::DimensionMismatch(format!(
                "x has {} coordinates but y has {}",
                x.len(),
                y.len()
            )));
        }
        let points = x
            .iter()
            .zip(y)
            .map(|(x, y)| Point2::new(x.clone(), y.clone()))
            .collect();
        Ok(Self::from_points(points))
    }

    /// Attaches a named value array, replacing any previous array with the same name.
    pub fn with_values(mut self, name: impl Into<String>, values: Vec<T>) -> Result<Self> {
        let name = name.into();
        if values.len() != self.points.len() {
            return Err(Error::DimensionMismatch(format!(
                "array `{}` has {} values but the point set has {} points",
                name,
                values.len(),
                self.points.len()
            )));
        }
        self.values.insert(name, values);
        Ok(self)
    }

    pub fn points(&self) -> &[Point2<T>] {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn values(&self, name: &str) -> Option<&[T]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Like [`values`](Self::values), but reports a missing array as an error.
    pub fn try_values(&self, name: &str) -> Result<&[T]> {
        self.values(name).ok_or_else(|| Error::MissingField { name: name.to_string() })
    }

    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
