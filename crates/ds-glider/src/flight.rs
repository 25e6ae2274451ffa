//! Per-knot flight quantities.
//!
//! Pure functions of (state, input) used for post-optimization reporting
//! and for phrasing the path constraints; the dynamics never call these.

use crate::glider::{Circulation, Glider, reg_norm};
use nalgebra::Vector3;

impl Glider {
    /// Heading of the relative velocity, measured from north (+y) toward
    /// east (+x) [rad].
    pub fn heading(&self, v_rel: &Vector3<f64>) -> f64 {
        v_rel.x.atan2(v_rel.y)
    }

    /// Flight-path angle of the relative velocity, positive climbing [rad].
    pub fn relative_flight_path_angle(&self, v_rel: &Vector3<f64>) -> f64 {
        (v_rel.z / reg_norm(v_rel)).asin()
    }

    /// Lift coefficient implied by the circulation at this relative speed.
    pub fn lift_coefficient(&self, v_rel: &Vector3<f64>, c: &Circulation) -> f64 {
        let p = self.params();
        let lift = c.cross(v_rel);
        2.0 * reg_norm(&lift) / (p.wing_area * (v_rel.dot(v_rel) + crate::NORM_EPSILON))
    }

    /// Load factor: lift magnitude over weight.
    pub fn load_factor(&self, v_rel: &Vector3<f64>, c: &Circulation) -> f64 {
        let p = self.params();
        reg_norm(&self.lift_force(v_rel, c)) / (p.mass * p.gravity)
    }

    /// Bank angle of the lift vector in the wind frame [rad].
    ///
    /// The lift force is perpendicular to the relative velocity by
    /// construction, so it decomposes exactly into a wind-frame "up" and
    /// "side" component; the bank angle is their atan2.
    pub fn bank_angle(&self, v_rel: &Vector3<f64>, c: &Circulation) -> f64 {
        let lift = c.cross(v_rel);
        let (side, up) = wind_frame_axes(v_rel);
        lift.dot(&side).atan2(lift.dot(&up))
    }
}

/// Wind-frame side and up unit directions for a relative velocity.
///
/// Side is horizontal, to the right of the relative velocity; up is
/// perpendicular to the relative velocity in its vertical plane.
pub fn wind_frame_axes(v_rel: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let e_z = Vector3::z();
    let side_raw = v_rel.cross(&e_z);
    let side = side_raw / reg_norm(&side_raw);
    let v_hat = v_rel / reg_norm(v_rel);
    let up = side.cross(&v_hat);
    (side, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glider::Glider;
    use ds_core::PhysicalParameters;

    fn glider() -> Glider {
        Glider::new(PhysicalParameters::default()).unwrap()
    }

    #[test]
    fn heading_of_northbound_flight_is_zero() {
        let glider = glider();
        let v = Vector3::new(0.0, 12.0, 0.0);
        assert!((glider.heading(&v)).abs() < 1e-12);
        let east = Vector3::new(12.0, 0.0, 0.0);
        assert!((glider.heading(&east) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn flight_path_angle_sign_follows_climb() {
        let glider = glider();
        let climbing = Vector3::new(10.0, 0.0, 2.0);
        let diving = Vector3::new(10.0, 0.0, -2.0);
        assert!(glider.relative_flight_path_angle(&climbing) > 0.0);
        assert!(glider.relative_flight_path_angle(&diving) < 0.0);
    }

    #[test]
    fn vertical_lift_has_zero_bank() {
        let glider = glider();
        // Level northbound flight with circulation toward the east gives a
        // lift force straight up.
        let v = Vector3::new(0.0, 12.0, 0.0);
        let c = Circulation::new(1.0, 0.0, 0.0);
        let lift = c.cross(&v);
        assert!(lift.x.abs() < 1e-12 && lift.y.abs() < 1e-12 && lift.z > 0.0);
        assert!(glider.bank_angle(&v, &c).abs() < 1e-9);
    }

    #[test]
    fn banked_lift_reports_the_tilt() {
        let glider = glider();
        let v = Vector3::new(0.0, 12.0, 0.0);
        // Tilt the circulation so the lift leans toward the east (side > 0).
        let c = Circulation::new(1.0, 0.0, -1.0);
        let phi = glider.bank_angle(&v, &c);
        assert!(phi > 0.5 && phi < 1.0, "bank {phi}");
    }

    #[test]
    fn unit_load_factor_when_lift_balances_weight() {
        let glider = glider();
        let p = *glider.params();
        let v = Vector3::new(0.0, 12.0, 0.0);
        // Circulation magnitude that makes rho * |c x v| = m * g.
        let c_mag = p.mass * p.gravity / (p.air_density * v.norm());
        let c = Circulation::new(c_mag, 0.0, 0.0);
        let n = glider.load_factor(&v, &c);
        assert!((n - 1.0).abs() < 1e-3, "load factor {n}");
    }

    #[test]
    fn lift_coefficient_scales_inversely_with_speed() {
        let glider = glider();
        let c = Circulation::new(1.0, 0.0, 0.0);
        let slow = glider.lift_coefficient(&Vector3::new(0.0, 10.0, 0.0), &c);
        let fast = glider.lift_coefficient(&Vector3::new(0.0, 20.0, 0.0), &c);
        // Lift itself grows linearly with speed, so c_L drops like 1/v.
        assert!((slow / fast - 2.0).abs() < 1e-2);
    }
}
