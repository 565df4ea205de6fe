use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector, RealField, Scalar, U2};
use serde::{Deserialize, Serialize};

mod primitives;
pub use primitives::*;

pub mod delaunay;
pub mod predicates;

#[cfg(feature = "proptest-support")]
pub mod proptest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "OVector<T, D>: Serialize",
    deserialize = "OVector<T, D>: Deserialize<'de>"
))]
pub struct AxisAlignedBoundingBox<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    min: OVector<T, D>,
    max: OVector<T, D>,
}

impl<T, D> Copy for AxisAlignedBoundingBox<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
    OVector<T, D>: Copy,
{
}

pub type AxisAlignedBoundingBox2d<T> = AxisAlignedBoundingBox<T, U2>;

impl<T, D> AxisAlignedBoundingBox<T, D>
where
    T: Scalar + PartialOrd,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub fn new(min: OVector<T, D>, max: OVector<T, D>) -> Self {
        for i in 0..D::dim() {
            assert!(min[i] <= max[i]);
        }
        Self { min, max }
    }

    pub fn min(&self) -> &OVector<T, D> {
        &self.min
    }

    pub fn max(&self) -> &OVector<T, D> {
        &self.max
    }
}

impl<T, D> From<OPoint<T, D>> for AxisAlignedBoundingBox<T, D>
where
    T: Scalar + PartialOrd,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    fn from(point: OPoint<T, D>) -> Self {
        AxisAlignedBoundingBox::new(point.coords.clone(), point.coords)
    }
}

impl<T, D> AxisAlignedBoundingBox<T, D>
where
    T: RealField,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    /// Computes the minimal bounding box which encloses both `this` and `other`.
    pub fn enclose(&self, other: &AxisAlignedBoundingBox<T, D>) -> Self {
        let min = self
            .min
            .iter()
            .zip(&other.min)
            .map(|(a, b)| T::min(a.clone(), b.clone()));
        let min = OVector::<T, D>::from_iterator(min);

        let max = self
            .max
            .iter()
            .zip(&other.max)
            .map(|(a, b)| T::max(a.clone(), b.clone()));
        let max = OVector::<T, D>::from_iterator(max);

        AxisAlignedBoundingBox::new(min, max)
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a OPoint<T, D>>) -> Option<Self> {
        let mut points = points.into_iter();
        points.next().map(|first_point| {
            points.fold(AxisAlignedBoundingBox::from(first_point.clone()), |aabb, point| {
                aabb.enclose(&AxisAlignedBoundingBox::from(point.clone()))
            })
        })
    }

    pub fn extents(&self) -> OVector<T, D> {
        self.max() - self.min()
    }

    pub fn max_extent(&self) -> T {
        (self.max() - self.min()).amax()
    }

    /// Whether the point lies inside the box or on its boundary.
    pub fn contains_point(&self, point: &OPoint<T, D>) -> bool {
        (0..D::dim()).all(|dim| point[dim] >= self.min[dim] && point[dim] <= self.max[dim])
    }

    /// Squared distance from the point to the closest point in the box (zero if the point is inside).
    pub fn dist2_to(&self, point: &OPoint<T, D>) -> T {
        (0..D::dim())
            .map(|i| {
                let below = self.min[i].clone() - point[i].clone();
                let above = point[i].clone() - self.max[i].clone();
                let d = T::max(T::max(below, above), T::zero());
                d.clone() * d
            })
            .fold(T::zero(), |acc, d2| acc + d2)
    }

    /// Grows the bounding box by `distance` in all directions.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use fenics_ice_geometry::AxisAlignedBoundingBox;
    /// # use nalgebra::vector;
    /// let aabb = AxisAlignedBoundingBox::new(vector![0.0, 0.0], vector![1.0, 1.0]);
    /// let grown = aabb.grow_uniformly(1.0);
    /// assert_eq!(grown.min(), &vector![-1.0, -1.0]);
    /// assert_eq!(grown.max(), &vector![2.0, 2.0]);
    /// ```
    pub fn grow_uniformly(&self, distance: T) -> Self {
        let min = self.min().map(|b_i| b_i - distance.clone());
        let max = self.max().map(|b_i| b_i + distance.clone());
        Self::new(min, max)
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    Counterclockwise,
}
