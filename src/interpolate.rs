//! Barycentric interpolation of scattered data with reusable weights.
use crate::error::{Error, Result};
use crate::scattered::ScatteredPointSet;
use crate::triangulation::Triangulation;
use fenics_ice_traits::Real;
use itertools::izip;
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

/// Interpolation weights for a fixed set of target points.
///
/// The value at target `i` is `sum_k weights[i][k] * u[vertices[i][k]]`, where `u` holds one value
/// per source point of the triangulation the weights were computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationWeights<T> {
    vertices: Vec<[usize; 3]>,
    weights: Vec<[T; 3]>,
    // Targets outside the convex hull of the source points
    missing: Vec<usize>,
    num_source_points: usize,
}

impl<T: Real> InterpolationWeights<T> {
    pub fn num_targets(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_source_points(&self) -> usize {
        self.num_source_points
    }

    pub fn vertices(&self) -> &[[usize; 3]] {
        &self.vertices
    }

    pub fn weights(&self) -> &[[T; 3]] {
        &self.weights
    }

    /// Indices of the targets that lie outside the convex hull of the source points.
    pub fn missing(&self) -> &[usize] {
        &self.missing
    }

    pub fn interpolate(&self, values: &[T]) -> Result<Vec<T>> {
        let mut result = vec![T::zero(); self.num_targets()];
        self.interpolate_into(&mut result, values)?;
        Ok(result)
    }

    pub fn interpolate_into(&self, result: &mut [T], values: &[T]) -> Result<()> {
        if values.len() != self.num_source_points {
            return Err(Error::DimensionMismatch(format!(
                "expected {} source values, got {}",
                self.num_source_points,
                values.len()
            )));
        }
        if result.len() != self.num_targets() {
            return Err(Error::DimensionMismatch(format!(
                "result buffer has length {} but there are {} targets",
                result.len(),
                self.num_targets()
            )));
        }

        for (r, vertices, weights) in izip!(result, &self.vertices, &self.weights) {
            *r = vertices
                .iter()
                .zip(weights)
                .fold(T::zero(), |acc, (&v, &w)| acc + values[v] * w);
        }
        Ok(())
    }
}

/// Computes interpolation weights for the target points.
///
/// Targets outside the convex hull are reported through a single warning and take the weights
/// of the closest point on the nearest triangle, i.e. they are extrapolated as a constant
/// along the direction normal to the hull.
pub fn compute_weights<T: Real>(
    triangulation: &Triangulation<T>,
    targets: &[Point2<T>],
) -> Result<InterpolationWeights<T>> {
    let mut vertices = Vec::with_capacity(targets.len());
    let mut weights = Vec::with_capacity(targets.len());
    let mut missing = Vec::new();

    for (i, target) in targets.iter().enumerate() {
        if !(target.x.is_finite() && target.y.is_finite()) {
            return Err(Error::InvalidGeometry(format!(
                "target point {i} has a non-finite coordinate"
            )));
        }

        let (t, w) = match triangulation.locate(target) {
            Some(located) => located,
            None => {
                missing.push(i);
                let (t, closest) = triangulation
                    .closest_triangle(target)
                    .expect("A triangulation always contains at least one triangle");
                (t, clamped_weights(triangulation.transform(t).weights(&closest)))
            }
        };
        vertices.push(triangulation.triangles()[t]);
        weights.push(w);
    }

    if !missing.is_empty() {
        warn!(
            "{} of {} points lie outside the convex hull of the source data \
             and are extrapolated from the nearest triangle",
            missing.len(),
            targets.len()
        );
    }

    Ok(InterpolationWeights {
        vertices,
        weights,
        missing,
        num_source_points: triangulation.num_points(),
    })
}

/// Removes round-off below zero and renormalizes to a partition of unity.
fn clamped_weights<T: Real>(weights: [T; 3]) -> [T; 3] {
    let clamped = weights.map(|w| w.max(T::zero()));
    let sum = clamped[0] + clamped[1] + clamped[2];
    clamped.map(|w| w / sum)
}

/// Interpolates source values with precomputed weights.
pub fn interpolate<T: Real>(values: &[T], weights: &InterpolationWeights<T>) -> Result<Vec<T>> {
    weights.interpolate(values)
}

struct CacheEntry<T: Real> {
    triangulation_id: u64,
    targets: Vec<Point2<T>>,
    weights: InterpolationWeights<T>,
}

/// Interpolation weights retained per target set, identified by a key such as a function space.
///
/// Weights are recomputed only if the target coordinates or the triangulation differ
/// from those of the cached entry.
pub struct WeightCache<K, T: Real> {
    entries: HashMap<K, CacheEntry<T>>,
}

impl<K, T: Real> Default for WeightCache<K, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, T> WeightCache<K, T>
where
    K: Hash + Eq,
    T: Real,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&InterpolationWeights<T>> {
        self.entries.get(key).map(|entry| &entry.weights)
    }

    pub fn get_or_compute(
        &mut self,
        key: K,
        triangulation: &Triangulation<T>,
        targets: &[Point2<T>],
    ) -> Result<&InterpolationWeights<T>> {
        let compute_entry = || -> Result<CacheEntry<T>> {
            debug!("Computing interpolation weights for {} points", targets.len());
            Ok(CacheEntry {
                triangulation_id: triangulation.id(),
                targets: targets.to_vec(),
                weights: compute_weights(triangulation, targets)?,
            })
        };

        let entry = match self.entries.entry(key) {
            Entry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                if entry.triangulation_id != triangulation.id() || entry.targets != targets {
                    *entry = compute_entry()?;
                }
                entry
            }
            Entry::Vacant(vacant) => vacant.insert(compute_entry()?),
        };
        Ok(&entry.weights)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Interpolates the named arrays of a scattered point set onto arbitrary target points.
///
/// The triangulation is built once; weights are computed once per target key and reused
/// for every value array.
pub struct ScatteredDataInterpolator<K, T: Real> {
    point_set: ScatteredPointSet<T>,
    triangulation: Triangulation<T>,
    cache: WeightCache<K, T>,
}

impl<K, T> ScatteredDataInterpolator<K, T>
where
    K: Hash + Eq,
    T: Real,
{
    pub fn new(point_set: ScatteredPointSet<T>) -> Result<Self> {
        let triangulation = Triangulation::from_point_set(&point_set)?;
        Ok(Self {
            point_set,
            triangulation,
            cache: WeightCache::new(),
        })
    }

    pub fn point_set(&self) -> &ScatteredPointSet<T> {
        &self.point_set
    }

    pub fn triangulation(&self) -> &Triangulation<T> {
        &self.triangulation
    }

    pub fn weights(&mut self, key: K, targets: &[Point2<T>]) -> Result<&InterpolationWeights<T>> {
        self.cache.get_or_compute(key, &self.triangulation, targets)
    }

    /// Interpolates the named array of the point set onto the targets.
    pub fn interpolate(&mut self, key: K, targets: &[Point2<T>], name: &str) -> Result<Vec<T>> {
        let values = self.point_set.try_values(name)?;
        let weights = self.cache.get_or_compute(key, &self.triangulation, targets)?;
        weights.interpolate(values)
    }

    /// Interpolates an arbitrary array with one value per source point onto the targets.
    pub fn interpolate_values(&mut self, key: K, targets: &[Point2<T>], values: &[T]) -> Result<Vec<T>> {
        self.weights(key, targets)?.interpolate(values)
    }
}
