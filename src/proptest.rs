use crate::grid::RegularGrid2d;
use crate::mesh::procedural::create_rectangular_uniform_tri_mesh_2d;
use crate::mesh::TriangleMesh2d;
use crate::scattered::ScatteredPointSet;
use crate::triangulation::Triangulation;
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use fenics_ice_geometry::proptest::point_cloud2;
use nalgebra::{DMatrix, Vector2};

/// Coefficients `(a, b, c)` of the linear function `a + b * x + c * y`.
pub fn linear_coefficients() -> impl Strategy<Value = (f64, Vector2<f64>)> {
    let range = -10.0..10.0;
    (range.clone(), [range.clone(), range]).prop_map(|(a, [b, c])| (a, Vector2::new(b, c)))
}

/// Random point sets carrying the array `f` sampled from a random linear function.
pub fn linear_point_set(max_points: usize) -> impl Strategy<Value = (ScatteredPointSet<f64>, (f64, Vector2<f64>))> {
    (point_cloud2(max_points), linear_coefficients()).prop_filter_map(
        "Point set must admit a triangulation",
        |(points, (a, gradient))| {
            let values = points.iter().map(|p| a + gradient.dot(&p.coords)).collect();
            let point_set = ScatteredPointSet::from_points(points).with_values("f", values).ok()?;
            Triangulation::from_point_set(&point_set)
                .ok()
                .map(|_| (point_set, (a, gradient)))
        },
    )
}

/// Uniform meshes of rectangles with random position, extents and resolution.
pub fn rectangular_mesh(max_cells_per_dim: usize) -> impl Strategy<Value = TriangleMesh2d<f64>> {
    let cells = 1..=max_cells_per_dim.max(1);
    (
        [-10.0..10.0, -10.0..10.0],
        [0.5..10.0, 0.5..10.0],
        cells.clone(),
        cells,
    )
        .prop_map(|([x0, y0], [width, height], cells_x, cells_y)| {
            let min = Vector2::new(x0, y0);
            let max = Vector2::new(x0 + width, y0 + height);
            create_rectangular_uniform_tri_mesh_2d(&min, &max, cells_x, cells_y)
        })
}

/// Uniformly spaced grids with at least two nodes per axis and random values.
pub fn regular_grid(max_nodes_per_dim: usize) -> impl Strategy<Value = RegularGrid2d<f64>> {
    let nodes = 2..=max_nodes_per_dim.max(2);
    (nodes.clone(), nodes, [-10.0..10.0, -10.0..10.0], [0.1..2.0, 0.1..2.0])
        .prop_flat_map(|(nx, ny, origin, spacing)| {
            (Just((nx, ny, origin, spacing)), vec(-100.0..100.0, nx * ny))
        })
        .prop_map(|((nx, ny, [x0, y0], [dx, dy]), values)| {
            let x = (0..nx).map(|i| x0 + i as f64 * dx).collect();
            let y = (0..ny).map(|j| y0 + j as f64 * dy).collect();
            RegularGrid2d::try_new(x, y, DMatrix::from_vec(nx, ny, values))
                .expect("Generated grid axes are strictly increasing")
        })
}
