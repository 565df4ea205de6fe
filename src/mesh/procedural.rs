//! Basic procedural mesh generation routines.
use crate::mesh::{Tri3d2Connectivity, TriangleMesh2d};
use fenics_ice_traits::Real;
use nalgebra::{Point2, Vector2};

pub fn create_unit_square_uniform_tri_mesh_2d<T>(cells_per_dim: usize) -> TriangleMesh2d<T>
where
    T: Real,
{
    create_rectangular_uniform_tri_mesh_2d(
        &Vector2::new(T::zero(), T::zero()),
        &Vector2::new(T::one(), T::one()),
        cells_per_dim,
        cells_per_dim,
    )
}

/// Generates a uniform triangle mesh of the axis-aligned rectangle `[min, max]`.
///
/// Every one of the `cells_x * cells_y` rectangular cells is split along its diagonal
/// from the lower-left to the upper-right corner. Vertices are numbered row by row,
/// starting in the lower-left corner.
pub fn create_rectangular_uniform_tri_mesh_2d<T>(
    min: &Vector2<T>,
    max: &Vector2<T>,
    cells_x: usize,
    cells_y: usize,
) -> TriangleMesh2d<T>
where
    T: Real,
{
    if cells_x == 0 || cells_y == 0 {
        return TriangleMesh2d::from_vertices_and_connectivity(Vec::new(), Vec::new());
    }

    let to_t = |n: usize| T::from_usize(n).expect("Must be able to fit usize in T");
    let extents = max - min;
    let h = Vector2::new(extents.x / to_t(cells_x), extents.y / to_t(cells_y));
    let to_global_vertex_index = |i, j| (cells_x + 1) * j + i;

    let mut vertices = Vec::with_capacity((cells_x + 1) * (cells_y + 1));
    for j in 0..=cells_y {
        for i in 0..=cells_x {
            // Place the last row and column exactly on the boundary
            let x = if i == cells_x { max.x } else { min.x + to_t(i) * h.x };
            let y = if j == cells_y { max.y } else { min.y + to_t(j) * h.y };
            vertices.push(Point2::new(x, y));
        }
    }

    let mut cells = Vec::with_capacity(2 * cells_x * cells_y);
    for j in 0..cells_y {
        for i in 0..cells_x {
            let v00 = to_global_vertex_index(i, j);
            let v10 = to_global_vertex_index(i + 1, j);
            let v01 = to_global_vertex_index(i, j + 1);
            let v11 = to_global_vertex_index(i + 1, j + 1);
            cells.push(Tri3d2Connectivity([v00, v10, v11]));
            cells.push(Tri3d2Connectivity([v00, v11, v01]));
        }
    }

    TriangleMesh2d::from_vertices_and_connectivity(vertices, cells)
}
