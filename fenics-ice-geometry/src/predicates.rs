use fenics_ice_traits::Real;
use nalgebra::{matrix, Point2};

/// Twice the signed area of the triangle `(a, b, c)`.
///
/// Positive if `c` lies to the left of the directed line from `a` to `b`.
pub fn orient2d_inexact<T: Real>(a: &Point2<T>, b: &Point2<T>, c: &Point2<T>) -> T {
    matrix![a.x, a.y, T::one();
            b.x, b.y, T::one();
            c.x, c.y, T::one()]
    .determinant()
}

/// Positive if `d` lies strictly inside the circumcircle of the counter-clockwise triangle `(a, b, c)`,
/// negative if it lies outside and zero if the four points are cocircular.
pub fn incircle_inexact<T: Real>(a: &Point2<T>, b: &Point2<T>, c: &Point2<T>, d: &Point2<T>) -> T {
    let (ad, bd, cd) = (a - d, b - d, c - d);
    matrix![ad.x, ad.y, ad.norm_squared();
            bd.x, bd.y, bd.norm_squared();
            cd.x, cd.y, cd.norm_squared()]
    .determinant()
}
