//! Wind profile configuration.

use ds_core::{DsError, DsResult};

/// Constants shared by the analytic wind profiles.
///
/// These were module-level globals in earlier tooling; here they are an
/// explicit immutable value handed to each profile at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindProfileConfig {
    /// Wind speed at the reference height [m/s]
    pub ref_speed: f64,
    /// Reference height [m]
    pub ref_height: f64,
    /// Altitude below which wind and shear are exactly zero [m].
    /// Doubles as the aerodynamic roughness length of the logarithmic profile.
    pub ground_offset: f64,
    /// Exponent of the exponential (power-law) profile
    pub shear_exponent: f64,
    /// Shear layer thickness of the logistic profile [m]
    pub shear_layer_thickness: f64,
}

impl Default for WindProfileConfig {
    fn default() -> Self {
        Self {
            ref_speed: 15.0,
            ref_height: 10.0,
            ground_offset: 0.03,
            shear_exponent: 0.143,
            shear_layer_thickness: 3.0,
        }
    }
}

impl WindProfileConfig {
    pub fn validate(&self) -> DsResult<()> {
        let entries = [
            ("ref_speed", self.ref_speed),
            ("ref_height", self.ref_height),
            ("ground_offset", self.ground_offset),
            ("shear_exponent", self.shear_exponent),
            ("shear_layer_thickness", self.shear_layer_thickness),
        ];
        for (what, value) in entries {
            if !value.is_finite() {
                return Err(DsError::Config {
                    what: format!("wind {what} must be finite, got {value}"),
                });
            }
        }
        if self.ref_speed < 0.0 {
            return Err(DsError::Config {
                what: format!("wind ref_speed must be non-negative, got {}", self.ref_speed),
            });
        }
        if self.ref_height <= 0.0 || self.ground_offset <= 0.0 || self.shear_layer_thickness <= 0.0
        {
            return Err(DsError::Config {
                what: "wind ref_height, ground_offset and shear_layer_thickness must be positive"
                    .to_string(),
            });
        }
        if self.ground_offset >= self.ref_height {
            return Err(DsError::Config {
                what: format!(
                    "wind ground_offset ({}) must lie below ref_height ({})",
                    self.ground_offset, self.ref_height
                ),
            });
        }
        Ok(())
    }
}
