//! Wind model trait.

use crate::config::WindProfileConfig;
use nalgebra::{Matrix3, Vector3};

/// Trait for analytic wind profiles.
///
/// Implementations provide the profile formula above the ground offset;
/// the provided methods apply the no-wind-below-ground policy and build
/// the vector quantities consumed by the dynamics and the transcription.
/// Implementations must be thread-safe (Send + Sync).
pub trait WindModel: Send + Sync {
    /// Get the profile name (for diagnostics/CLI).
    fn name(&self) -> &str;

    /// Shared profile constants.
    fn config(&self) -> &WindProfileConfig;

    /// Wind speed [m/s] at altitude z. Only called for z at or above the
    /// ground offset; the formula need not be defined below it.
    fn freestream_speed(&self, z: f64) -> f64;

    /// Altitude derivative of the wind speed [1/s]. Same domain contract
    /// as `freestream_speed`.
    fn freestream_shear(&self, z: f64) -> f64;

    /// Wind speed with the ground policy applied: exactly zero below the
    /// ground offset.
    fn speed(&self, z: f64) -> f64 {
        if z < self.config().ground_offset {
            0.0
        } else {
            self.freestream_speed(z)
        }
    }

    /// Wind shear with the ground policy applied.
    fn shear(&self, z: f64) -> f64 {
        if z < self.config().ground_offset {
            0.0
        } else {
            self.freestream_shear(z)
        }
    }

    /// Time derivative of the wind speed seen by a vehicle climbing at z_dot.
    fn speed_rate(&self, z: f64, z_dot: f64) -> f64 {
        self.shear(z) * z_dot
    }

    /// Wind vector in ENU coordinates. The wind blows from north to south,
    /// along the negative y axis.
    fn vector(&self, z: f64) -> Vector3<f64> {
        Vector3::new(0.0, -self.speed(z), 0.0)
    }

    /// Altitude derivative of the wind vector.
    fn vector_derivative(&self, z: f64) -> Vector3<f64> {
        Vector3::new(0.0, -self.shear(z), 0.0)
    }

    /// Jacobian of the wind vector with respect to position. Only the
    /// (y, z) entry is nonzero for these horizontally uniform profiles.
    fn jacobian(&self, z: f64) -> Matrix3<f64> {
        let mut jac = Matrix3::zeros();
        jac[(1, 2)] = -self.shear(z);
        jac
    }
}
