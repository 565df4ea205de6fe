use crate::geometry::{AxisAlignedBoundingBox2d, Triangle, Triangle2d};
use fenics_ice_traits::Real;
use nalgebra::{Point2, Scalar};
use serde::{Deserialize, Serialize};

pub mod procedural;

/// Connectivity of a linear triangle, given as three vertex indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tri3d2Connectivity(pub [usize; 3]);

impl Tri3d2Connectivity {
    pub fn vertex_indices(&self) -> &[usize] {
        &self.0
    }

    pub fn cell<T: Scalar>(&self, vertices: &[Point2<T>]) -> Option<Triangle2d<T>> {
        let [a, b, c] = self.0;
        Some(Triangle([
            vertices.get(a)?.clone(),
            vertices.get(b)?.clone(),
            vertices.get(c)?.clone(),
        ]))
    }
}

/// Index-based triangle mesh in two dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct TriangleMesh2d<T: Scalar> {
    vertices: Vec<Point2<T>>,
    connectivity: Vec<Tri3d2Connectivity>,
}

impl<T: Scalar> TriangleMesh2d<T> {
    pub fn vertices(&self) -> &[Point2<T>] {
        &self.vertices
    }

    pub fn connectivity(&self) -> &[Tri3d2Connectivity] {
        &self.connectivity
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_cells(&self) -> usize {
        self.connectivity.len()
    }

    /// Construct a mesh from vertices and connectivity.
    ///
    /// Every connectivity entry must reference valid vertex indices; this is checked
    /// by [`try_from_vertices_and_connectivity`](Self::try_from_vertices_and_connectivity).
    pub fn from_vertices_and_connectivity(vertices: Vec<Point2<T>>, connectivity: Vec<Tri3d2Connectivity>) -> Self {
        Self { vertices, connectivity }
    }

    pub fn try_from_vertices_and_connectivity(
        vertices: Vec<Point2<T>>,
        connectivity: Vec<Tri3d2Connectivity>,
    ) -> eyre::Result<Self> {
        if let Some((cell, conn)) = connectivity
            .iter()
            .enumerate()
            .find(|(_, conn)| conn.0.iter().any(|&v| v >= vertices.len()))
        {
            return Err(eyre::eyre!(
                "cell {} references vertices {:?}, but the mesh only has {} vertices",
                cell,
                conn.0,
                vertices.len()
            ));
        }
        Ok(Self { vertices, connectivity })
    }

    pub fn get_cell(&self, index: usize) -> Option<Triangle2d<T>> {
        self.connectivity
            .get(index)
            .and_then(|conn| conn.cell(&self.vertices))
    }

    pub fn cell_iter(&self) -> impl '_ + Iterator<Item = Triangle2d<T>> {
        self.connectivity.iter().map(move |connectivity| {
            connectivity
                .cell(&self.vertices)
                .expect("Mesh is not allowed to contain cells with indices out of bounds.")
        })
    }
}

impl<T: Real> TriangleMesh2d<T> {
    pub fn bounding_box(&self) -> Option<AxisAlignedBoundingBox2d<T>> {
        AxisAlignedBoundingBox2d::from_points(&self.vertices)
    }

    pub fn cell_centroids(&self) -> Vec<Point2<T>> {
        self.cell_iter().map(|cell| cell.centroid()).collect()
    }
}
