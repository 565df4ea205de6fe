use crate::{Orientation, Triangle, Triangle2d};
use nalgebra::Point2;
use proptest::collection::vec;
use proptest::prelude::*;

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Pick a reasonably small range to pick coordinates from,
    // otherwise we can easily get floating point numbers that are
    // so ridiculously large as to break anything we might want to do with them
    let range = -10.0..10.0;
    [range.clone(), range].prop_map(|[x, y]| Point2::new(x, y))
}

/// Points on a coarse lattice, which frequently produces duplicate, collinear and cocircular points.
pub fn lattice_point2() -> impl Strategy<Value = Point2<f64>> {
    [-5..=5i32, -5..=5i32].prop_map(|[i, j]| Point2::new(i as f64, j as f64))
}

pub fn point_cloud2(max_points: usize) -> impl Strategy<Value = Vec<Point2<f64>>> {
    vec(point2(), 3..=max_points.max(3))
}

pub fn lattice_point_cloud2(max_points: usize) -> impl Strategy<Value = Vec<Point2<f64>>> {
    vec(lattice_point2(), 3..=max_points.max(3))
}

/// Non-degenerate triangles with the requested orientation.
pub fn triangle2d(orientation: Orientation) -> impl Strategy<Value = Triangle2d<f64>> {
    [point2(), point2(), point2()]
        .prop_map(Triangle)
        .prop_filter("Triangle must not be degenerate", |triangle| triangle.area() > 1e-2)
        .prop_map(move |mut triangle| {
            if triangle.orientation() != orientation {
                triangle.0.swap(1, 2);
            }
            triangle
        })
}

impl Arbitrary for Triangle2d<f64> {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        [point2(), point2(), point2()].prop_map(Triangle).boxed()
    }
}
