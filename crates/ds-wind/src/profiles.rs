//! Analytic wind profiles.

use crate::config::WindProfileConfig;
use crate::model::WindModel;
use ds_core::{DsError, DsResult};

/// Profile selector, a pure configuration choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindProfileKind {
    Linear,
    Logarithmic,
    Exponential,
    Logistic,
}

impl WindProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindProfileKind::Linear => "linear",
            WindProfileKind::Logarithmic => "logarithmic",
            WindProfileKind::Exponential => "exponential",
            WindProfileKind::Logistic => "logistic",
        }
    }

    pub fn from_name(name: &str) -> DsResult<Self> {
        match name {
            "linear" => Ok(WindProfileKind::Linear),
            "logarithmic" | "log" => Ok(WindProfileKind::Logarithmic),
            "exponential" | "exp" => Ok(WindProfileKind::Exponential),
            "logistic" => Ok(WindProfileKind::Logistic),
            other => Err(DsError::Config {
                what: format!("unknown wind profile '{other}'"),
            }),
        }
    }

    /// Construct the selected profile after validating the configuration.
    pub fn build(&self, config: WindProfileConfig) -> DsResult<Box<dyn WindModel>> {
        config.validate()?;
        Ok(match self {
            WindProfileKind::Linear => Box::new(LinearWind::new(config)),
            WindProfileKind::Logarithmic => Box::new(LogarithmicWind::new(config)),
            WindProfileKind::Exponential => Box::new(ExponentialWind::new(config)),
            WindProfileKind::Logistic => Box::new(LogisticWind::new(config)),
        })
    }
}

impl Default for WindProfileKind {
    /// The logarithmic boundary-layer profile is the reference choice.
    fn default() -> Self {
        WindProfileKind::Logarithmic
    }
}

/// Wind speed growing linearly with altitude.
#[derive(Clone, Debug)]
pub struct LinearWind {
    config: WindProfileConfig,
}

impl LinearWind {
    pub fn new(config: WindProfileConfig) -> Self {
        Self { config }
    }
}

impl WindModel for LinearWind {
    fn name(&self) -> &str {
        "linear"
    }

    fn config(&self) -> &WindProfileConfig {
        &self.config
    }

    fn freestream_speed(&self, z: f64) -> f64 {
        self.config.ref_speed / self.config.ref_height * z
    }

    fn freestream_shear(&self, _z: f64) -> f64 {
        self.config.ref_speed / self.config.ref_height
    }
}

/// Logarithmic boundary-layer profile with the ground offset as roughness
/// length.
#[derive(Clone, Debug)]
pub struct LogarithmicWind {
    config: WindProfileConfig,
}

impl LogarithmicWind {
    pub fn new(config: WindProfileConfig) -> Self {
        Self { config }
    }

    fn log_ratio(&self) -> f64 {
        (self.config.ref_height / self.config.ground_offset).ln()
    }
}

impl WindModel for LogarithmicWind {
    fn name(&self) -> &str {
        "logarithmic"
    }

    fn config(&self) -> &WindProfileConfig {
        &self.config
    }

    fn freestream_speed(&self, z: f64) -> f64 {
        self.config.ref_speed * (z / self.config.ground_offset).ln() / self.log_ratio()
    }

    fn freestream_shear(&self, z: f64) -> f64 {
        self.config.ref_speed / (self.log_ratio() * z)
    }
}

/// Power-law profile.
#[derive(Clone, Debug)]
pub struct ExponentialWind {
    config: WindProfileConfig,
}

impl ExponentialWind {
    pub fn new(config: WindProfileConfig) -> Self {
        Self { config }
    }
}

impl WindModel for ExponentialWind {
    fn name(&self) -> &str {
        "exponential"
    }

    fn config(&self) -> &WindProfileConfig {
        &self.config
    }

    fn freestream_speed(&self, z: f64) -> f64 {
        self.config.ref_speed * (z / self.config.ref_height).powf(self.config.shear_exponent)
    }

    fn freestream_shear(&self, z: f64) -> f64 {
        self.config.shear_exponent * self.config.ref_speed / z
            * (z / self.config.ref_height).powf(self.config.shear_exponent)
    }
}

/// Logistic shear-layer profile.
#[derive(Clone, Debug)]
pub struct LogisticWind {
    config: WindProfileConfig,
}

impl LogisticWind {
    pub fn new(config: WindProfileConfig) -> Self {
        Self { config }
    }
}

impl WindModel for LogisticWind {
    fn name(&self) -> &str {
        "logistic"
    }

    fn config(&self) -> &WindProfileConfig {
        &self.config
    }

    fn freestream_speed(&self, z: f64) -> f64 {
        let delta = self.config.shear_layer_thickness;
        self.config.ref_speed / (1.0 + (-z / delta).exp())
    }

    fn freestream_shear(&self, z: f64) -> f64 {
        let delta = self.config.shear_layer_thickness;
        let e = (-z / delta).exp();
        self.config.ref_speed * e / (delta * (1.0 + e) * (1.0 + e))
    }
}
