//! Incremental Delaunay triangulation of planar point sets.
//!
//! Points are inserted one at a time with the Bowyer-Watson algorithm. The exterior of the
//! convex hull is represented by *ghost triangles*, i.e. triangles `[u, v, GHOST]` attached to
//! every hull edge `u -> v`, so that points outside the current hull need no special treatment.
use crate::predicates::{incircle_inexact, orient2d_inexact};
use fenics_ice_traits::Real;
use itertools::Itertools;
use log::{debug, warn};
use nalgebra::Point2;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const GHOST: usize = usize::MAX;
const NONE: usize = usize::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelaunayError {
    #[error("at least 3 distinct points are required for a triangulation, got {distinct}")]
    TooFewPoints { distinct: usize },
    #[error("all {num_points} points are collinear")]
    Collinear { num_points: usize },
    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// The result of triangulating a set of points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelaunayTriangulation {
    triangles: Vec<[usize; 3]>,
    duplicates: Vec<(usize, usize)>,
    skipped: Vec<usize>,
}

impl DelaunayTriangulation {
    /// Triangles as counter-clockwise triples of indices into the input points.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Pairs `(duplicate, original)` of input points with identical coordinates.
    ///
    /// Only the original takes part in the triangulation.
    pub fn duplicates(&self) -> &[(usize, usize)] {
        &self.duplicates
    }

    /// Points that could not be inserted because of floating-point breakdown.
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }
}

/// Computes the Delaunay triangulation of the given points.
///
/// Points with identical coordinates are only inserted once. The result is deterministic
/// for a given input.
pub fn triangulate<T: Real>(points: &[Point2<T>]) -> Result<DelaunayTriangulation, DelaunayError> {
    if let Some(index) = points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        return Err(DelaunayError::NonFinite { index });
    }

    let (unique, duplicates) = deduplicate(points);
    if unique.len() < 3 {
        return Err(DelaunayError::TooFewPoints { distinct: unique.len() });
    }
    if !duplicates.is_empty() {
        debug!("Ignoring {} duplicate points in triangulation", duplicates.len());
    }

    let order = insertion_order(points, unique);
    let (a, b) = (order[0], order[1]);
    let c = order[2..]
        .iter()
        .copied()
        .find(|&c| orient2d_inexact(&points[a], &points[b], &points[c]) != T::zero())
        .ok_or(DelaunayError::Collinear {
            num_points: points.len(),
        })?;

    let mut builder = Builder::new(points, [a, b, c]);
    let mut skipped = Vec::new();
    for &i in order.iter().filter(|&&i| i != a && i != b && i != c) {
        if !builder.insert(i) {
            skipped.push(i);
        }
    }
    if !skipped.is_empty() {
        warn!(
            "{} points could not be inserted into the triangulation due to numerical degeneracy",
            skipped.len()
        );
    }

    Ok(DelaunayTriangulation {
        triangles: builder.into_triangles(),
        duplicates,
        skipped,
    })
}

fn lexicographic_cmp<T: Real>(p: &Point2<T>, q: &Point2<T>) -> Ordering {
    p.x.partial_cmp(&q.x)
        .unwrap_or(Ordering::Equal)
        .then(p.y.partial_cmp(&q.y).unwrap_or(Ordering::Equal))
}

/// Splits the point indices into distinct points and `(duplicate, original)` pairs.
fn deduplicate<T: Real>(points: &[Point2<T>]) -> (Vec<usize>, Vec<(usize, usize)>) {
    let mut sorted: Vec<usize> = (0..points.len()).collect();
    // Stable sort keeps the lowest index first among equal points
    sorted.sort_by(|&i, &j| lexicographic_cmp(&points[i], &points[j]));

    let mut unique = Vec::with_capacity(points.len());
    let mut duplicates = Vec::new();
    for (_, group) in &sorted.into_iter().group_by(|&i| (points[i].x, points[i].y)) {
        let mut group = group;
        if let Some(original) = group.next() {
            unique.push(original);
            duplicates.extend(group.map(|duplicate| (duplicate, original)));
        }
    }
    duplicates.sort_unstable();
    (unique, duplicates)
}

/// Orders points in horizontal strips of equal population, traversed in alternating
/// directions, so that consecutive insertions are spatially close.
fn insertion_order<T: Real>(points: &[Point2<T>], mut indices: Vec<usize>) -> Vec<usize> {
    let n = indices.len();
    let strip_size = ((n as f64).sqrt().ceil() as usize).max(1);
    indices.sort_by(|&i, &j| {
        points[i]
            .y
            .partial_cmp(&points[j].y)
            .unwrap_or(Ordering::Equal)
            .then(i.cmp(&j))
    });
    for (strip_index, strip) in indices.chunks_mut(strip_size).enumerate() {
        strip.sort_by(|&i, &j| {
            let ordering = lexicographic_cmp(&points[i], &points[j]);
            if strip_index % 2 == 0 {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
    indices
}

struct Builder<'a, T: Real> {
    points: &'a [Point2<T>],
    triangles: Vec<[usize; 3]>,
    /// `neighbors[t][i]` is the triangle across the edge opposite vertex `i` of triangle `t`.
    neighbors: Vec<[usize; 3]>,
    alive: Vec<bool>,
    free: Vec<usize>,
    last: usize,
}

impl<'a, T: Real> Builder<'a, T> {
    fn new(points: &'a [Point2<T>], [a, mut b, mut c]: [usize; 3]) -> Self {
        if orient2d_inexact(&points[a], &points[b], &points[c]) < T::zero() {
            std::mem::swap(&mut b, &mut c);
        }

        let mut builder = Self {
            points,
            triangles: Vec::new(),
            neighbors: Vec::new(),
            alive: Vec::new(),
            free: Vec::new(),
            last: 0,
        };
        let initial = [
            builder.allocate([a, b, c]),
            builder.allocate([b, a, GHOST]),
            builder.allocate([c, b, GHOST]),
            builder.allocate([a, c, GHOST]),
        ];
        builder.link(&initial);
        builder.last = initial[0];
        builder
    }

    fn allocate(&mut self, vertices: [usize; 3]) -> usize {
        if let Some(t) = self.free.pop() {
            self.triangles[t] = vertices;
            self.neighbors[t] = [NONE; 3];
            self.alive[t] = true;
            t
        } else {
            self.triangles.push(vertices);
            self.neighbors.push([NONE; 3]);
            self.alive.push(true);
            self.triangles.len() - 1
        }
    }

    fn release(&mut self, t: usize) {
        self.alive[t] = false;
        self.free.push(t);
    }

    /// Connects the given triangles to each other across shared edges.
    fn link(&mut self, new_triangles: &[usize]) {
        let mut edges = HashMap::with_capacity(3 * new_triangles.len());
        for &t in new_triangles {
            let tri = self.triangles[t];
            for i in 0..3 {
                edges.insert((tri[(i + 1) % 3], tri[(i + 2) % 3]), (t, i));
            }
        }
        for &t in new_triangles {
            let tri = self.triangles[t];
            for i in 0..3 {
                if let Some(&(other, _)) = edges.get(&(tri[(i + 2) % 3], tri[(i + 1) % 3])) {
                    self.neighbors[t][i] = other;
                }
            }
        }
    }

    fn is_ghost(&self, t: usize) -> bool {
        self.triangles[t][2] == GHOST
    }

    fn point(&self, v: usize) -> &Point2<T> {
        &self.points[v]
    }

    /// Whether inserting `p` invalidates triangle `t`.
    fn conflicts(&self, t: usize, p: &Point2<T>) -> bool {
        let [a, b, c] = self.triangles[t];
        if c == GHOST {
            let (u, v) = (self.point(a), self.point(b));
            let orientation = orient2d_inexact(u, v, p);
            orientation > T::zero()
                || (orientation == T::zero() && (p - u).dot(&(v - u)) > T::zero() && (p - v).dot(&(u - v)) > T::zero())
        } else {
            incircle_inexact(self.point(a), self.point(b), self.point(c), p) > T::zero()
        }
    }

    /// Walks from the most recently created triangle towards `p`.
    ///
    /// Returns either a real triangle containing `p` or a ghost triangle whose hull edge is visible from `p`.
    fn walk(&self, p: &Point2<T>) -> Option<usize> {
        let mut t = if self.alive[self.last] {
            self.last
        } else {
            (0..self.triangles.len()).find(|&t| self.alive[t] && !self.is_ghost(t))?
        };

        let max_steps = 2 * self.triangles.len() + 8;
        for step in 0..max_steps {
            if self.is_ghost(t) {
                return Some(t);
            }
            let tri = self.triangles[t];
            let next = (0..3).map(|k| (k + step) % 3).find(|&i| {
                let (x, y) = (tri[(i + 1) % 3], tri[(i + 2) % 3]);
                orient2d_inexact(self.point(x), self.point(y), p) < T::zero()
            });
            match next {
                Some(i) => t = self.neighbors[t][i],
                None => return Some(t),
            }
        }
        None
    }

    fn find_seed(&self, p: &Point2<T>) -> Option<usize> {
        if let Some(t) = self.walk(p) {
            if self.conflicts(t, p) {
                return Some(t);
            }
            if let Some(&n) = self.neighbors[t]
                .iter()
                .find(|&&n| n != NONE && self.conflicts(n, p))
            {
                return Some(n);
            }
        }
        debug!("Point location walk failed, falling back to linear search");
        (0..self.triangles.len()).find(|&t| self.alive[t] && self.conflicts(t, p))
    }

    /// Collects the connected set of conflicting triangles around `seed`, excluding `excluded`.
    fn cavity(&self, seed: usize, p: &Point2<T>, excluded: &HashSet<usize>) -> HashSet<usize> {
        let mut cavity = HashSet::new();
        let mut stack = vec![seed];
        cavity.insert(seed);
        while let Some(t) = stack.pop() {
            for &n in &self.neighbors[t] {
                if n != NONE && !cavity.contains(&n) && !excluded.contains(&n) && self.conflicts(n, p) {
                    cavity.insert(n);
                    stack.push(n);
                }
            }
        }
        cavity
    }

    /// Returns the boundary edges `(x, y, outer)` of the cavity, oriented as in the cavity triangles.
    fn cavity_boundary(&self, cavity: &HashSet<usize>) -> Vec<(usize, usize, usize, usize)> {
        let mut boundary = Vec::new();
        // Sorting keeps the construction independent of hash iteration order
        for &t in cavity.iter().sorted() {
            let tri = self.triangles[t];
            for i in 0..3 {
                let outer = self.neighbors[t][i];
                if !cavity.contains(&outer) {
                    boundary.push((tri[(i + 1) % 3], tri[(i + 2) % 3], outer, t));
                }
            }
        }
        boundary
    }

    /// Inserts point `index`. Returns `false` if the point had to be skipped.
    fn insert(&mut self, index: usize) -> bool {
        let p = self.points[index];
        let seed = match self.find_seed(&p) {
            Some(seed) => seed,
            None => return false,
        };

        // Shrink the cavity until it is star-shaped with respect to p
        let mut excluded = HashSet::new();
        let (cavity, boundary) = loop {
            let cavity = self.cavity(seed, &p, &excluded);
            let boundary = self.cavity_boundary(&cavity);
            let invalid_owners: Vec<usize> = boundary
                .iter()
                .filter(|&&(x, y, _, _)| {
                    x != GHOST && y != GHOST && orient2d_inexact(self.point(x), self.point(y), &p) <= T::zero()
                })
                .map(|&(_, _, _, owner)| owner)
                .collect();
            if invalid_owners.is_empty() {
                break (cavity, boundary);
            }
            if invalid_owners.contains(&seed) {
                return false;
            }
            excluded.extend(invalid_owners);
        };

        for &t in cavity.iter().sorted() {
            self.release(t);
        }

        let mut new_triangles = Vec::with_capacity(boundary.len());
        for &(x, y, outer, _) in &boundary {
            let (vertices, outer_index) = if x == GHOST {
                ([y, index, GHOST], 1)
            } else if y == GHOST {
                ([index, x, GHOST], 0)
            } else {
                ([x, y, index], 2)
            };
            let t = self.allocate(vertices);
            self.neighbors[t][outer_index] = outer;
            if let Some(j) = self.triangles[outer]
                .iter()
                .position(|&v| v != x && v != y)
            {
                self.neighbors[outer][j] = t;
            }
            new_triangles.push(t);
        }
        self.link(&new_triangles);

        if let Some(&t) = new_triangles.iter().find(|&&t| !self.is_ghost(t)) {
            self.last = t;
        }
        true
    }

    fn into_triangles(self) -> Vec<[usize; 3]> {
        self.triangles
            .iter()
            .zip(&self.alive)
            .filter(|&(tri, &alive)| alive && tri[2] != GHOST)
            .map(|(tri, _)| *tri)
            .collect()
    }
}
