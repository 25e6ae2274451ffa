//! Derived glide-performance numbers.
//!
//! Standard glide-polar results for the drag model
//! `C_D = c_Dp + C_L^2 / (pi * AR)`. These are reported to the operator
//! before a solve and used to scale the average-speed guess; the optimizer
//! itself never consumes them.

use crate::glider::Glider;

impl Glider {
    /// Best achievable lift-to-drag ratio.
    pub fn optimal_glide_ratio(&self) -> f64 {
        let p = self.params();
        0.5 * (std::f64::consts::PI * p.aspect_ratio() / p.parasitic_drag).sqrt()
    }

    /// Glide-path angle below horizontal at the best glide ratio [rad].
    pub fn optimal_glide_angle(&self) -> f64 {
        (1.0 / self.optimal_glide_ratio()).atan()
    }

    /// Lift coefficient at the best glide ratio.
    pub fn optimal_lift_coeff(&self) -> f64 {
        let p = self.params();
        (std::f64::consts::PI * p.aspect_ratio() * p.parasitic_drag).sqrt()
    }

    /// Airspeed on the best-glide descent [m/s].
    pub fn optimal_glide_speed(&self) -> f64 {
        let p = self.params();
        (2.0 * p.mass * p.gravity / (p.air_density * p.wing_area * self.optimal_lift_coeff()))
            .sqrt()
    }

    /// Level-flight airspeed at the best-glide lift coefficient [m/s].
    pub fn level_glide_speed(&self) -> f64 {
        self.optimal_glide_speed() * self.optimal_glide_angle().cos().sqrt()
    }

    /// Characteristic time scale V_l / g [s].
    pub fn characteristic_time(&self) -> f64 {
        self.level_glide_speed() / self.params().gravity
    }
}
