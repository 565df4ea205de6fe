use fenics_ice_geometry::LineSegment2d;
use nalgebra::{point, vector};

#[test]
fn closest_point_is_clamped_to_segment() {
    let segment = LineSegment2d::new(point![1.0, 1.0], point![3.0, 1.0]);
    assert_eq!(segment.tangent_dir(), vector![2.0, 0.0]);

    assert_eq!(segment.closest_point_parametric(&point![2.0, 5.0]), 0.5);
    assert_eq!(segment.closest_point(&point![2.0, 5.0]), point![2.0, 1.0]);
    assert_eq!(segment.closest_point(&point![-4.0, 0.0]), point![1.0, 1.0]);
    assert_eq!(segment.closest_point(&point![10.0, 2.0]), point![3.0, 1.0]);
    assert_eq!(segment.point_from_parameter(0.25), point![1.5, 1.0]);
}

#[test]
fn degenerate_segment_collapses_to_its_start() {
    let segment = LineSegment2d::new(point![1.0, 2.0], point![1.0, 2.0]);
    assert_eq!(segment.closest_point_parametric(&point![5.0, 5.0]), 0.0);
    assert_eq!(segment.closest_point(&point![5.0, 5.0]), point![1.0, 2.0]);
}
