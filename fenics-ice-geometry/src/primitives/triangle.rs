use crate::{AxisAlignedBoundingBox, LineSegment2d, Orientation};
use fenics_ice_traits::Real;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, Matrix2, OPoint, OVector, Point2, RealField, Scalar, U2};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "OPoint<T, D>: Serialize",
    deserialize = "OPoint<T, D>: Deserialize<'de>"
))]
pub struct Triangle<T, D>(pub [OPoint<T, D>; 3])
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>;

/// A triangle in two dimensions, consisting of three vertices.
///
/// Triangles produced by the Delaunay triangulation are counter-clockwise, but the type
/// itself makes no assumption on the winding order.
pub type Triangle2d<T> = Triangle<T, U2>;

impl<T, D> Copy for Triangle<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
    OPoint<T, D>: Copy,
{
}

impl<T, D> Triangle<T, D>
where
    T: RealField,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub fn centroid(&self) -> OPoint<T, D> {
        let mut centroid = OVector::zeros();
        for p in &self.0 {
            centroid += &p.coords * T::from_f64(1.0 / 3.0).unwrap();
        }
        OPoint::from(centroid)
    }

    pub fn bounding_box(&self) -> AxisAlignedBoundingBox<T, D> {
        let [a, b, c] = &self.0;
        AxisAlignedBoundingBox::from(a.clone())
            .enclose(&AxisAlignedBoundingBox::from(b.clone()))
            .enclose(&AxisAlignedBoundingBox::from(c.clone()))
    }
}

impl<T> Triangle2d<T>
where
    T: Real,
{
    pub fn orientation(&self) -> Orientation {
        if self.signed_area() >= T::zero() {
            Orientation::Counterclockwise
        } else {
            Orientation::Clockwise
        }
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T."))]
    pub fn signed_area(&self) -> T {
        let [a, b, c] = &self.0;
        let ab = b - a;
        let ac = c - a;
        0.5 * ab.perp(&ac)
    }

    pub fn area(&self) -> T {
        self.signed_area().abs()
    }

    /// Returns the affine map from physical coordinates to barycentric coordinates.
    ///
    /// Returns `None` if the triangle is degenerate.
    pub fn barycentric_transform(&self) -> Option<BarycentricTransform<T>> {
        let [a, b, c] = &self.0;
        let matrix = Matrix2::from_columns(&[a - c, b - c]);
        let inverse = matrix.try_inverse()?;
        if inverse.iter().all(|x| x.is_finite()) {
            Some(BarycentricTransform { inverse, origin: *c })
        } else {
            None
        }
    }

    /// Returns the point in the (closed) triangle closest to the given point.
    pub fn closest_point(&self, point: &Point2<T>) -> Point2<T> {
        let [a, b, c] = self.0;
        if self.contains_point(point) {
            return *point;
        }

        [(a, b), (b, c), (c, a)]
            .into_iter()
            .map(|(start, end)| LineSegment2d::new(start, end).closest_point(point))
            .map(|q| ((q - point).norm_squared(), q))
            .fold(None, |best: Option<(T, Point2<T>)>, (d2, q)| match best {
                Some((best_d2, _)) if best_d2 <= d2 => best,
                _ => Some((d2, q)),
            })
            .map(|(_, q)| q)
            .unwrap_or(*point)
    }

    /// Whether the point lies inside the triangle or on its boundary.
    pub fn contains_point(&self, point: &Point2<T>) -> bool {
        let [a, b, c] = &self.0;
        let sign = if self.orientation() == Orientation::Counterclockwise {
            T::one()
        } else {
            -T::one()
        };
        let side = |p: &Point2<T>, q: &Point2<T>| sign * (q - p).perp(&(point - p)) >= T::zero();
        side(a, b) && side(b, c) && side(c, a)
    }
}

/// Affine map taking a point `x` to the barycentric coordinates of `x` with respect to a triangle `(a, b, c)`.
///
/// The first two coordinates are given by `inverse * (x - c)`, the third is one minus their sum.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BarycentricTransform<T: Real> {
    inverse: Matrix2<T>,
    origin: Point2<T>,
}

impl<T: Real> BarycentricTransform<T> {
    pub fn inverse(&self) -> &Matrix2<T> {
        &self.inverse
    }

    pub fn origin(&self) -> &Point2<T> {
        &self.origin
    }

    pub fn weights(&self, point: &Point2<T>) -> [T; 3] {
        let lambda = self.inverse * (point - self.origin);
        [lambda[0], lambda[1], T::one() - lambda[0] - lambda[1]]
    }
}
