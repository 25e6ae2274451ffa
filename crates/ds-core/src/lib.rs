//! ds-core: stable foundation for dynsoar.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - params (glider physical parameters + trajectory constraints)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod params;

// Re-exports: nice ergonomics for downstream crates
pub use error::{DsError, DsResult};
pub use numeric::*;
pub use params::{PhysicalParameters, TrajectoryConstraints};
