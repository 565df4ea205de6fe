use nalgebra::{clamp, Point2, RealField, Scalar, Vector2};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineSegment2d<T>
where
    T: Scalar,
{
    start: Point2<T>,
    end: Point2<T>,
}

impl<T> LineSegment2d<T>
where
    T: Scalar,
{
    pub fn new(from: Point2<T>, to: Point2<T>) -> Self {
        Self { start: from, end: to }
    }

    pub fn start(&self) -> &Point2<T> {
        &self.start
    }

    pub fn end(&self) -> &Point2<T> {
        &self.end
    }
}

impl<T> LineSegment2d<T>
where
    T: RealField,
{
    /// Returns a vector tangent to the line segment.
    ///
    /// Note that the vector is **not** normalized.
    pub fn tangent_dir(&self) -> Vector2<T> {
        &self.end.coords - &self.start.coords
    }

    /// Compute the closest point on the segment to the given point, represented in
    /// the parametric form x = a + t * (b - a).
    pub fn closest_point_parametric(&self, point: &Point2<T>) -> T {
        let d = self.tangent_dir();
        let d2 = d.magnitude_squared();
        if d2 == T::zero() {
            // Degenerate segment, every parameter gives the same point
            T::zero()
        } else {
            let t = (point - &self.start).dot(&d) / d2;
            clamp(t, T::zero(), T::one())
        }
    }

    /// Computes the closest point on the segment to the given point.
    pub fn closest_point(&self, point: &Point2<T>) -> Point2<T> {
        let t = self.closest_point_parametric(point);
        self.point_from_parameter(t)
    }

    pub fn point_from_parameter(&self, t: T) -> Point2<T> {
        Point2::from(&self.start.coords + self.tangent_dir() * t)
    }
}
