use nalgebra::RealField;

pub use nalgebra;

/// Scalar type used for coordinates and field values throughout `fenics-ice`.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
