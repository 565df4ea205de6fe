use crate::error::{Error, Result};
use crate::scattered::ScatteredPointSet;
use fenics_ice_geometry::delaunay::triangulate;
use fenics_ice_geometry::{AxisAlignedBoundingBox2d, BarycentricTransform, Triangle, Triangle2d};
use fenics_ice_traits::Real;
use log::{debug, warn};
use nalgebra::Point2;
use rstar::primitives::GeomWithData;
use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};
use std::sync::atomic::{AtomicU64, Ordering};

/// Barycentric weights may be this much below zero for a point to still count as inside a triangle.
const CONTAINMENT_TOLERANCE: f64 = 1e-10;

static NEXT_TRIANGULATION_ID: AtomicU64 = AtomicU64::new(0);

fn to_f64<T: Real>(x: T) -> f64 {
    x.to_subset().expect("Real scalars must be representable as f64")
}

struct RTreeAabb(AxisAlignedBoundingBox2d<f64>);

impl RTreeObject for RTreeAabb {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let Self(aabb) = self;
        AABB::from_corners([aabb.min().x, aabb.min().y], [aabb.max().x, aabb.max().y])
    }
}

impl PointDistance for RTreeAabb {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.0.dist2_to(&Point2::from(*point))
    }

    fn contains_point(&self, point: &<Self::Envelope as Envelope>::Point) -> bool {
        self.0.contains_point(&Point2::from(*point))
    }
}

/// Delaunay triangulation of a scattered point set, with point location.
///
/// Triangles are counter-clockwise triples of indices into [`points`](Self::points).
/// Each triangle carries the affine map to barycentric coordinates, so that weights
/// for a located point cost a single 2x2 matrix-vector product.
pub struct Triangulation<T: Real> {
    id: u64,
    points: Vec<Point2<T>>,
    triangles: Vec<[usize; 3]>,
    transforms: Vec<BarycentricTransform<T>>,
    tree: RTree<GeomWithData<RTreeAabb, usize>>,
}

impl<T: Real> std::fmt::Debug for Triangulation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Triangulation")
            .field("num_points", &self.points.len())
            .field("num_triangles", &self.triangles.len())
            .finish()
    }
}

impl<T: Real> Triangulation<T> {
    /// Triangulates the given points.
    ///
    /// Fails with [`Error::InvalidGeometry`] unless there are at least 3 distinct,
    /// non-collinear, finite points.
    pub fn build(points: &[Point2<T>]) -> Result<Self> {
        let delaunay = triangulate(points)?;
        if !delaunay.duplicates().is_empty() {
            warn!(
                "{} duplicate points were ignored when triangulating {} points",
                delaunay.duplicates().len(),
                points.len()
            );
        }

        let mut triangles = Vec::with_capacity(delaunay.triangles().len());
        let mut transforms = Vec::with_capacity(delaunay.triangles().len());
        for &[a, b, c] in delaunay.triangles() {
            let triangle = triangle_from_vertices(points, [a, b, c]);
            match triangle.barycentric_transform() {
                Some(transform) => {
                    triangles.push([a, b, c]);
                    transforms.push(transform);
                }
                None => debug!("Discarding degenerate triangle [{a}, {b}, {c}]"),
            }
        }
        if triangles.is_empty() {
            return Err(Error::InvalidGeometry(
                "triangulation contains no non-degenerate triangles".to_string(),
            ));
        }

        let geometries = triangles
            .iter()
            .enumerate()
            .map(|(i, &vertices)| {
                let aabb = triangle_from_vertices(points, vertices).bounding_box();
                let min = aabb.min().map(to_f64);
                let max = aabb.max().map(to_f64);
                // Enlarge the box slightly to accommodate floating point errors
                let margin = 1e-9 * (1.0 + (max - min).amax());
                let aabb = AxisAlignedBoundingBox2d::new(min, max).grow_uniformly(margin);
                GeomWithData::new(RTreeAabb(aabb), i)
            })
            .collect();

        Ok(Self {
            id: NEXT_TRIANGULATION_ID.fetch_add(1, Ordering::Relaxed),
            points: points.to_vec(),
            triangles,
            transforms,
            tree: RTree::bulk_load(geometries),
        })
    }

    pub fn from_point_set(point_set: &ScatteredPointSet<T>) -> Result<Self> {
        Self::build(point_set.points())
    }

    /// Identifier that is unique to this triangulation within the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn points(&self) -> &[Point2<T>] {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangle(&self, index: usize) -> Triangle2d<T> {
        triangle_from_vertices(&self.points, self.triangles[index])
    }

    pub fn transform(&self, index: usize) -> &BarycentricTransform<T> {
        &self.transforms[index]
    }

    /// Finds the triangle containing the point, together with the point's barycentric weights.
    ///
    /// Points on an edge shared by several triangles resolve to the triangle with the lowest index.
    /// Returns `None` if the point lies outside the convex hull of the triangulation.
    pub fn locate(&self, point: &Point2<T>) -> Option<(usize, [T; 3])> {
        let query = [to_f64(point.x), to_f64(point.y)];
        let tolerance = T::from_f64(CONTAINMENT_TOLERANCE).expect("Literal must fit in T.");
        self.tree
            .locate_all_at_point(&query)
            .map(|geom| geom.data)
            .filter_map(|t| {
                let weights = self.transforms[t].weights(point);
                weights
                    .iter()
                    .all(|&w| w >= -tolerance)
                    .then_some((t, weights))
            })
            .min_by_key(|&(t, _)| t)
    }

    /// Finds the triangle closest to the point and the closest point on that triangle.
    pub fn closest_triangle(&self, point: &Point2<T>) -> Option<(usize, Point2<T>)> {
        let query = [to_f64(point.x), to_f64(point.y)];
        let mut closest: Option<(usize, Point2<T>, T)> = None;
        for geom in self.tree.nearest_neighbor_iter(&query) {
            if let Some((_, _, d2_min)) = closest {
                // Boxes are visited in order of increasing distance, so no later
                // triangle can be closer than the best one found so far
                if geom.distance_2(&query) > to_f64(d2_min) {
                    break;
                }
            }
            let t = geom.data;
            let q = self.triangle(t).closest_point(point);
            let d2 = (q - point).norm_squared();
            let is_closer = match closest {
                Some((t_min, _, d2_min)) => d2 < d2_min || (d2 == d2_min && t < t_min),
                None => true,
            };
            if is_closer {
                closest = Some((t, q, d2));
            }
        }
        closest.map(|(t, q, _)| (t, q))
    }
}

fn triangle_from_vertices<T: Real>(points: &[Point2<T>], [a, b, c]: [usize; 3]) -> Triangle2d<T> {
    Triangle([points[a], points[b], points[c]])
}
