use fenics_ice_geometry::predicates::{incircle_inexact, orient2d_inexact};
use fenics_ice_geometry::{Triangle, Triangle2d};
use matrixcompare::assert_scalar_eq;
use nalgebra::point;
use proptest::prelude::*;

#[test]
fn test_orient2d_inexact_simple_example() {
    let a = point![1.0, 0.0];
    let b = point![2.0, 1.0];
    let c = point![-1.0, 2.0];
    assert_scalar_eq!(orient2d_inexact(&a, &b, &c), 2.0 * Triangle([a, b, c]).signed_area(),
        comp = abs, tol = 1e-9);
    assert!(orient2d_inexact(&a, &c, &b) < 0.0);
}

#[test]
fn incircle_inexact_unit_circle() {
    let a = point![1.0, 0.0];
    let b = point![0.0, 1.0];
    let c = point![-1.0, 0.0];
    assert!(incircle_inexact(&a, &b, &c, &point![0.0, 0.0]) > 0.0);
    assert!(incircle_inexact(&a, &b, &c, &point![0.5, -0.5]) > 0.0);
    assert!(incircle_inexact(&a, &b, &c, &point![2.0, 0.0]) < 0.0);
    assert_scalar_eq!(incircle_inexact(&a, &b, &c, &point![0.0, -1.0]), 0.0, comp = abs, tol = 1e-14);
}

proptest! {
    #[test]
    fn orient2d_inexact_matches_twice_triangle_signed_area(triangle: Triangle2d<f64>) {
        let Triangle([a, b, c]) = &triangle;
        assert_scalar_eq!(orient2d_inexact(&a, &b, &c), 2.0 * triangle.signed_area(),
            comp = abs, tol = 1e-9 * triangle.area().max(1.0));
    }
}
