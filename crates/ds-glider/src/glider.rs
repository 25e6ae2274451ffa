//! Continuous-time glider equations of motion.

use ds_core::{DsResult, PhysicalParameters};
use ds_wind::WindModel;
use nalgebra::{SVector, Vector3};

/// Full state in ENU coordinates: [x, y, z, xdot, ydot, zdot].
pub type GliderState = SVector<f64, 6>;

/// Circulation control vector (lift-vector surrogate).
pub type Circulation = Vector3<f64>;

/// Regularization added inside every vector norm before taking the square
/// root. The gradient of a Euclidean norm blows up at zero; the optimizer
/// differentiates through the dynamics, so the norm must stay smooth even
/// at zero relative speed.
pub const NORM_EPSILON: f64 = 1e-3;

/// Regularized Euclidean norm, finite and differentiable everywhere.
pub fn reg_norm(v: &Vector3<f64>) -> f64 {
    (v.dot(v) + NORM_EPSILON).sqrt()
}

/// Glider model: physical constants plus the equations of motion.
#[derive(Clone, Debug)]
pub struct Glider {
    params: PhysicalParameters,
}

impl Glider {
    pub fn new(params: PhysicalParameters) -> DsResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    /// Vehicle velocity relative to the ambient wind at its altitude.
    pub fn relative_velocity(&self, state: &GliderState, wind: &dyn WindModel) -> Vector3<f64> {
        let velocity = state.fixed_rows::<3>(3).into_owned();
        velocity - wind.vector(state[2])
    }

    /// Aerodynamic lift force for a given relative velocity and circulation.
    pub fn lift_force(&self, v_rel: &Vector3<f64>, c: &Circulation) -> Vector3<f64> {
        self.params.air_density * c.cross(v_rel)
    }

    /// State derivative xdot = f(x, u) under the given wind field.
    ///
    /// Position derivative is velocity. Velocity derivative combines the
    /// circulation lift force, parasitic drag, lift-induced drag and
    /// gravity. The regularized norms keep the result finite even at
    /// exactly zero relative speed.
    pub fn continuous_dynamics(
        &self,
        state: &GliderState,
        c: &Circulation,
        wind: &dyn WindModel,
    ) -> GliderState {
        let p = &self.params;
        let velocity = state.fixed_rows::<3>(3).into_owned();
        let v_rel = velocity - wind.vector(state[2]);
        let rel_speed = reg_norm(&v_rel);

        let lift = self.lift_force(&v_rel, c);
        let parasitic =
            0.5 * p.air_density * p.wing_area * p.parasitic_drag * rel_speed * v_rel;
        let induced = (2.0 * p.air_density / std::f64::consts::PI)
            * (c.dot(c) / (p.wingspan * p.wingspan))
            * (v_rel / rel_speed);
        let weight = Vector3::new(0.0, 0.0, -p.mass * p.gravity);

        let accel = (lift - parasitic - induced + weight) / p.mass;

        let mut xdot = GliderState::zeros();
        xdot.fixed_rows_mut::<3>(0).copy_from(&velocity);
        xdot.fixed_rows_mut::<3>(3).copy_from(&accel);
        xdot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_wind::{LogarithmicWind, WindProfileConfig};

    fn glider() -> Glider {
        Glider::new(PhysicalParameters::default()).unwrap()
    }

    fn wind() -> LogarithmicWind {
        LogarithmicWind::new(WindProfileConfig::default())
    }

    #[test]
    fn position_derivative_is_velocity() {
        let glider = glider();
        let wind = wind();
        let state = GliderState::from_column_slice(&[0.0, 0.0, 10.0, 3.0, -2.0, 1.0]);
        let c = Circulation::new(0.5, 0.0, 0.2);
        let xdot = glider.continuous_dynamics(&state, &c, &wind);
        assert_eq!(xdot[0], 3.0);
        assert_eq!(xdot[1], -2.0);
        assert_eq!(xdot[2], 1.0);
    }

    #[test]
    fn free_fall_at_zero_relative_speed() {
        // Velocity exactly equal to the ambient wind, no circulation:
        // every aerodynamic term vanishes and only gravity remains.
        let glider = glider();
        let wind = wind();
        let z = 10.0;
        let w = wind.vector(z);
        let state = GliderState::from_column_slice(&[0.0, 0.0, z, w[0], w[1], w[2]]);
        let c = Circulation::zeros();
        let xdot = glider.continuous_dynamics(&state, &c, &wind);
        assert!((xdot[3]).abs() < 1e-12);
        assert!((xdot[4]).abs() < 1e-12);
        assert!((xdot[5] + glider.params().gravity).abs() < 1e-12);
    }

    #[test]
    fn dynamics_finite_at_zero_relative_speed_with_circulation() {
        let glider = glider();
        let wind = wind();
        let z = 5.0;
        let w = wind.vector(z);
        let state = GliderState::from_column_slice(&[1.0, 2.0, z, w[0], w[1], w[2]]);
        let c = Circulation::new(2.0, -1.0, 0.5);
        let xdot = glider.continuous_dynamics(&state, &c, &wind);
        for i in 0..6 {
            assert!(xdot[i].is_finite(), "component {i} not finite: {}", xdot[i]);
        }
    }

    #[test]
    fn reg_norm_never_zero() {
        assert!(reg_norm(&Vector3::zeros()) > 0.0);
        assert!((reg_norm(&Vector3::zeros()) - NORM_EPSILON.sqrt()).abs() < 1e-15);
    }
}
