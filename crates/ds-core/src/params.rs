//! Glider physical parameters and trajectory constraints.
//!
//! Both records are created once from configuration, validated up front,
//! and shared read-only by every other crate. Validation failures here
//! abort the run before any solve is attempted.

use crate::error::{DsError, DsResult};

/// Physical constants of the glider and its environment (SI units).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalParameters {
    /// Vehicle mass [kg]
    pub mass: f64,
    /// Parasitic drag coefficient (dimensionless)
    pub parasitic_drag: f64,
    /// Wing reference area [m²]
    pub wing_area: f64,
    /// Wingspan [m]
    pub wingspan: f64,
    /// Air density [kg/m³]
    pub air_density: f64,
    /// Gravitational acceleration [m/s²]
    pub gravity: f64,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            mass: 8.5,
            parasitic_drag: 0.033,
            wing_area: 0.65,
            wingspan: 3.306,
            air_density: 1.255,
            gravity: 9.81,
        }
    }
}

impl PhysicalParameters {
    /// Aspect ratio b²/A, derived.
    pub fn aspect_ratio(&self) -> f64 {
        self.wingspan * self.wingspan / self.wing_area
    }

    pub fn validate(&self) -> DsResult<()> {
        let entries = [
            ("mass", self.mass),
            ("parasitic_drag", self.parasitic_drag),
            ("wing_area", self.wing_area),
            ("wingspan", self.wingspan),
            ("air_density", self.air_density),
            ("gravity", self.gravity),
        ];
        for (what, value) in entries {
            if !value.is_finite() || value <= 0.0 {
                return Err(DsError::Config {
                    what: format!("{what} must be positive and finite, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Feasible-region limits for the trajectory optimization (SI units, radians).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrajectoryConstraints {
    /// Maximum bank angle magnitude [rad]
    pub max_bank_angle: f64,
    /// Maximum lift coefficient
    pub max_lift_coeff: f64,
    /// Minimum lift coefficient
    pub min_lift_coeff: f64,
    /// Maximum load factor (lift / weight)
    pub max_load_factor: f64,
    /// Minimum height above ground [m]
    pub min_height: f64,
    /// Maximum height above ground [m]
    pub max_height: f64,
    /// Minimum net horizontal travel per period [m]
    pub min_travel_distance: f64,
    /// Ground offset below which there is no wind [m]
    pub ground_offset: f64,
}

impl Default for TrajectoryConstraints {
    fn default() -> Self {
        Self {
            max_bank_angle: 1.2,
            max_lift_coeff: 1.5,
            min_lift_coeff: 0.0,
            max_load_factor: 3.0,
            min_height: 0.5,
            max_height: 100.0,
            min_travel_distance: 5.0,
            ground_offset: 0.03,
        }
    }
}

impl TrajectoryConstraints {
    pub fn validate(&self) -> DsResult<()> {
        let entries = [
            ("max_bank_angle", self.max_bank_angle),
            ("max_lift_coeff", self.max_lift_coeff),
            ("min_lift_coeff", self.min_lift_coeff),
            ("max_load_factor", self.max_load_factor),
            ("min_height", self.min_height),
            ("max_height", self.max_height),
            ("min_travel_distance", self.min_travel_distance),
            ("ground_offset", self.ground_offset),
        ];
        for (what, value) in entries {
            if !value.is_finite() {
                return Err(DsError::Config {
                    what: format!("{what} must be finite, got {value}"),
                });
            }
        }
        if self.min_height >= self.max_height {
            return Err(DsError::Config {
                what: format!(
                    "min_height ({}) must be below max_height ({})",
                    self.min_height, self.max_height
                ),
            });
        }
        if self.min_lift_coeff >= self.max_lift_coeff {
            return Err(DsError::Config {
                what: format!(
                    "min_lift_coeff ({}) must be below max_lift_coeff ({})",
                    self.min_lift_coeff, self.max_lift_coeff
                ),
            });
        }
        if self.max_bank_angle <= 0.0 || self.max_bank_angle >= std::f64::consts::FRAC_PI_2 {
            return Err(DsError::Config {
                what: format!(
                    "max_bank_angle must lie in (0, pi/2), got {}",
                    self.max_bank_angle
                ),
            });
        }
        if self.max_load_factor <= 0.0 {
            return Err(DsError::Config {
                what: format!("max_load_factor must be positive, got {}", self.max_load_factor),
            });
        }
        if self.min_travel_distance <= 0.0 {
            return Err(DsError::Config {
                what: format!(
                    "min_travel_distance must be positive, got {}",
                    self.min_travel_distance
                ),
            });
        }
        if self.ground_offset <= 0.0 {
            return Err(DsError::Config {
                what: format!("ground_offset must be positive, got {}", self.ground_offset),
            });
        }
        Ok(())
    }
}
