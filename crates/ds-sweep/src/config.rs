//! Sweep and retry configuration.

use ds_core::{DsError, DsResult};

/// Multiplicative retry constants of the per-angle state machine.
///
/// The defaults are the reference values; all of them are tunable because
/// the right factors depend on how fragile the underlying solve is for a
/// given glider and wind profile.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Period growth after a solve saturated the time step at its upper bound
    pub saturation_grow: f64,
    /// Period shrink after a solve saturated the time step at its lower bound
    pub saturation_shrink: f64,
    /// Period shrink after a failed (locally infeasible) solve
    pub failure_shrink: f64,
    /// Period guess below which the warm start is abandoned and the guess reset
    pub period_floor: f64,
    /// Speed-guess shrink applied when even from-scratch solves keep failing
    pub speed_shrink: f64,
    /// Speed guess below which the angle is recorded as unsolved
    pub speed_floor: f64,
    /// Hard cap on solve attempts per angle; the multiplicative rules bound
    /// the loop already, this is the backstop against a pathological
    /// saturation ping-pong
    pub max_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            saturation_grow: 1.1,
            saturation_shrink: 0.9,
            failure_shrink: 0.95,
            period_floor: 4.0,
            speed_shrink: 0.8,
            speed_floor: 0.3,
            max_attempts: 100,
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> DsResult<()> {
        if !(self.saturation_grow > 1.0) {
            return Err(DsError::Config {
                what: format!("saturation_grow must exceed 1, got {}", self.saturation_grow),
            });
        }
        for (what, value) in [
            ("saturation_shrink", self.saturation_shrink),
            ("failure_shrink", self.failure_shrink),
            ("speed_shrink", self.speed_shrink),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(DsError::Config {
                    what: format!("{what} must lie in (0, 1), got {value}"),
                });
            }
        }
        if !(self.period_floor > 0.0 && self.speed_floor > 0.0) {
            return Err(DsError::Config {
                what: "period_floor and speed_floor must be positive".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(DsError::Config {
                what: "max_attempts must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// What to sweep: how many angles, where to start, and the initial guesses.
#[derive(Clone, Copy, Debug)]
pub struct SweepConfig {
    /// First travel angle [rad]
    pub start_angle: f64,
    /// Number of angles, uniformly covering the full circle
    pub angle_count: usize,
    /// Initial period guess [s]
    pub period_guess: f64,
    /// Initial average-speed guess [m/s]; typically a multiple of the
    /// glider's level-flight glide speed
    pub avg_speed_guess: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_angle: std::f64::consts::FRAC_PI_2,
            angle_count: 9,
            period_guess: 8.0,
            avg_speed_guess: 25.0,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> DsResult<()> {
        if self.angle_count == 0 {
            return Err(DsError::Config {
                what: "angle_count must be positive".to_string(),
            });
        }
        if !self.start_angle.is_finite() {
            return Err(DsError::Config {
                what: format!("start_angle must be finite, got {}", self.start_angle),
            });
        }
        if !(self.period_guess.is_finite() && self.period_guess > 0.0) {
            return Err(DsError::Config {
                what: format!("period_guess must be positive, got {}", self.period_guess),
            });
        }
        if !(self.avg_speed_guess.is_finite() && self.avg_speed_guess > 0.0) {
            return Err(DsError::Config {
                what: format!(
                    "avg_speed_guess must be positive, got {}",
                    self.avg_speed_guess
                ),
            });
        }
        Ok(())
    }

    /// The sweep sequence: `angle_count` uniformly spaced angles starting
    /// at `start_angle` and wrapping around the circle, each visited
    /// exactly once.
    pub fn travel_angles(&self) -> Vec<f64> {
        let tau = std::f64::consts::TAU;
        let increment = tau / self.angle_count as f64;
        (0..self.angle_count)
            .map(|k| (self.start_angle + k as f64 * increment) % tau)
            .collect()
    }
}
