//! Scalar function spaces on triangle meshes and functions living on them.
//!
//! Only the two spaces needed for loading data are provided: continuous piecewise linear
//! functions ([`SpaceKind::Lagrange1`], one degree of freedom per mesh vertex) and
//! piecewise constant functions ([`SpaceKind::Dg0`], one degree of freedom per cell,
//! located at the cell centroid).
use crate::error::{Error, Result};
use crate::mesh::TriangleMesh2d;
use fenics_ice_traits::Real;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceKind {
    Lagrange1,
    Dg0,
}

impl fmt::Display for SpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceKind::Lagrange1 => write!(f, "Lagrange 1"),
            SpaceKind::Dg0 => write!(f, "DG 0"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSpace<T: Real> {
    mesh: Arc<TriangleMesh2d<T>>,
    kind: SpaceKind,
    dof_coordinates: Vec<Point2<T>>,
}

impl<T: Real> FunctionSpace<T> {
    pub fn new(mesh: Arc<TriangleMesh2d<T>>, kind: SpaceKind) -> Self {
        let dof_coordinates = match kind {
            SpaceKind::Lagrange1 => mesh.vertices().to_vec(),
            SpaceKind::Dg0 => mesh.cell_centroids(),
        };
        Self {
            mesh,
            kind,
            dof_coordinates,
        }
    }

    pub fn lagrange1(mesh: Arc<TriangleMesh2d<T>>) -> Self {
        Self::new(mesh, SpaceKind::Lagrange1)
    }

    pub fn dg0(mesh: Arc<TriangleMesh2d<T>>) -> Self {
        Self::new(mesh, SpaceKind::Dg0)
    }

    pub fn kind(&self) -> SpaceKind {
        self.kind
    }

    pub fn mesh(&self) -> &Arc<TriangleMesh2d<T>> {
        &self.mesh
    }

    /// Number of degrees of freedom.
    pub fn dim(&self) -> usize {
        self.dof_coordinates.len()
    }

    pub fn tabulate_dof_coordinates(&self) -> &[Point2<T>] {
        &self.dof_coordinates
    }

    /// Degrees of freedom associated with the given cell.
    pub fn cell_dofs(&self, cell: usize) -> Vec<usize> {
        match self.kind {
            SpaceKind::Lagrange1 => self.mesh.connectivity()[cell].vertex_indices().to_vec(),
            SpaceKind::Dg0 => vec![cell],
        }
    }
}

static NEXT_UNNAMED_ID: AtomicUsize = AtomicUsize::new(0);

/// A function given by its degrees of freedom in a function space.
#[derive(Debug, Clone, PartialEq)]
pub struct Function<T: Real> {
    name: String,
    space: Arc<FunctionSpace<T>>,
    values: Vec<T>,
}

impl<T: Real> Function<T> {
    /// A function with all degrees of freedom set to zero.
    pub fn new(space: Arc<FunctionSpace<T>>, name: impl Into<String>) -> Self {
        Self::constant(space, name, T::zero())
    }

    pub fn constant(space: Arc<FunctionSpace<T>>, name: impl Into<String>, value: T) -> Self {
        let values = vec![value; space.dim()];
        Self {
            name: name.into(),
            space,
            values,
        }
    }

    pub fn from_values(space: Arc<FunctionSpace<T>>, name: impl Into<String>, values: Vec<T>) -> Result<Self> {
        let name = name.into();
        if values.len() != space.dim() {
            return Err(Error::DimensionMismatch(format!(
                "function `{}` has {} values but the space has {} degrees of freedom",
                name,
                values.len(),
                space.dim()
            )));
        }
        Ok(Self { name, space, values })
    }

    /// A zero function with an automatically generated name of the form `f_<n>`.
    pub fn unnamed(space: Arc<FunctionSpace<T>>) -> Self {
        let id = NEXT_UNNAMED_ID.fetch_add(1, Ordering::Relaxed);
        Self::new(space, format!("f_{id}"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the function carries a real name rather than an automatic `f_<n>` name.
    pub fn is_named(&self) -> bool {
        !is_automatic_name(&self.name)
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn space(&self) -> &Arc<FunctionSpace<T>> {
        &self.space
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }
}

/// Whether the name starts with an automatically generated prefix `f_<digit>`.
pub fn is_automatic_name(name: &str) -> bool {
    name.strip_prefix("f_")
        .and_then(|rest| rest.chars().next())
        .map_or(false, |c| c.is_ascii_digit())
}
