//! Interpolation of gridded and scattered input data onto finite element function spaces.
//!
//! Scattered observations are interpolated through a Delaunay triangulation of the source points,
//! with barycentric weights that are computed once per target space and reused for every
//! observed quantity. Gridded fields use bilinear or nearest-neighbour interpolation.
pub mod config;
pub mod error;
pub mod grid;
pub mod input;
pub mod interpolate;
pub mod io;
pub mod logging;
pub mod mesh;
pub mod model;
pub mod scattered;
pub mod space;
pub mod triangulation;

pub mod geometry {
    pub use fenics_ice_geometry::*;
}

#[cfg(feature = "proptest-support")]
pub mod proptest;

pub extern crate nalgebra;
pub extern crate vtkio;

pub use fenics_ice_traits::Real;
