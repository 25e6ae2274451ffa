//! Solver start-point strategies.
//!
//! Two ways to seed a solve: the canonical straight-line guess (level
//! flight along the travel direction with weight-supporting circulation),
//! and a warm start taken from a previously solved trajectory, resampled
//! when the knot counts differ.

use crate::trajectory::{Knot, Trajectory, travel_direction};
use ds_core::TrajectoryConstraints;
use ds_glider::{Glider, GliderState, reg_norm};
use ds_wind::WindModel;
use nalgebra::Vector3;

/// Straight-line initial guess: constant velocity along the travel
/// direction at mid-band height, circulation sized so lift balances
/// weight.
pub fn straight_line_guess(
    glider: &Glider,
    wind: &dyn WindModel,
    constraints: &TrajectoryConstraints,
    travel_angle: f64,
    period: f64,
    avg_speed: f64,
    knot_count: usize,
) -> Trajectory {
    let p = glider.params();
    let dir = travel_direction(travel_angle);
    let z_mid = 0.5 * (constraints.min_height + constraints.max_height);
    let velocity = dir * avg_speed;
    let v_rel = velocity - wind.vector(z_mid);

    // Circulation perpendicular to the relative wind whose lift force
    // points up and equals the weight.
    let side = v_rel.cross(&Vector3::z());
    let magnitude = p.mass * p.gravity / (p.air_density * reg_norm(&v_rel));
    let circulation = side * (magnitude / reg_norm(&side));

    let dt = period / (knot_count - 1) as f64;
    let knots = (0..knot_count)
        .map(|k| {
            let t = k as f64 * dt;
            let mut state = GliderState::zeros();
            let pos = dir * (avg_speed * t) + Vector3::new(0.0, 0.0, z_mid);
            state.fixed_rows_mut::<3>(0).copy_from(&pos);
            state.fixed_rows_mut::<3>(3).copy_from(&velocity);
            Knot {
                time: t,
                state,
                input: circulation,
            }
        })
        .collect();

    Trajectory {
        knots,
        period,
        avg_speed,
    }
}

/// Resample a trajectory onto a uniform grid with the requested knot
/// count, preserving period and average speed.
pub fn resample(trajectory: &Trajectory, knot_count: usize) -> Trajectory {
    if trajectory.knot_count() == knot_count {
        return trajectory.clone();
    }
    let t_end = trajectory
        .knots
        .last()
        .map(|knot| knot.time)
        .unwrap_or(0.0);
    let dt = t_end / (knot_count - 1) as f64;
    let knots = (0..knot_count)
        .map(|k| {
            let t = k as f64 * dt;
            let (state, input) = trajectory.sample(t);
            Knot {
                time: t,
                state,
                input,
            }
        })
        .collect();
    Trajectory {
        knots,
        period: trajectory.period,
        avg_speed: trajectory.avg_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_core::PhysicalParameters;
    use ds_wind::{LogarithmicWind, WindProfileConfig};

    fn setup() -> (Glider, LogarithmicWind, TrajectoryConstraints) {
        (
            Glider::new(PhysicalParameters::default()).unwrap(),
            LogarithmicWind::new(WindProfileConfig::default()),
            TrajectoryConstraints::default(),
        )
    }

    #[test]
    fn straight_line_is_periodic_by_construction() {
        let (glider, wind, constraints) = setup();
        let traj = straight_line_guess(&glider, &wind, &constraints, 0.7, 8.0, 12.0, 16);
        assert_eq!(traj.knot_count(), 16);
        assert!(traj.periodicity_error(0.7) < 1e-9);
    }

    #[test]
    fn straight_line_lift_roughly_balances_weight() {
        let (glider, wind, constraints) = setup();
        let traj = straight_line_guess(&glider, &wind, &constraints, 0.0, 8.0, 12.0, 8);
        let knot = &traj.knots[0];
        let v_rel = glider.relative_velocity(&knot.state, &wind);
        let n = glider.load_factor(&v_rel, &knot.input);
        assert!((n - 1.0).abs() < 0.05, "load factor {n}");
    }

    #[test]
    fn straight_line_flies_mid_band() {
        let (glider, wind, constraints) = setup();
        let traj = straight_line_guess(&glider, &wind, &constraints, 1.0, 6.0, 10.0, 8);
        let z_mid = 0.5 * (constraints.min_height + constraints.max_height);
        for knot in &traj.knots {
            assert!((knot.state[2] - z_mid).abs() < 1e-12);
        }
    }

    #[test]
    fn resample_changes_knot_count_and_keeps_endpoints() {
        let (glider, wind, constraints) = setup();
        let traj = straight_line_guess(&glider, &wind, &constraints, 0.3, 8.0, 12.0, 16);
        let coarse = resample(&traj, 9);
        assert_eq!(coarse.knot_count(), 9);
        assert!((coarse.period - traj.period).abs() < 1e-12);
        let orig_first = &traj.knots[0];
        let orig_last = traj.knots.last().unwrap();
        assert!((coarse.knots[0].state - orig_first.state).amax() < 1e-9);
        assert!((coarse.knots.last().unwrap().state - orig_last.state).amax() < 1e-9);
    }

    #[test]
    fn resample_same_count_is_identity() {
        let (glider, wind, constraints) = setup();
        let traj = straight_line_guess(&glider, &wind, &constraints, 0.3, 8.0, 12.0, 12);
        let same = resample(&traj, 12);
        assert_eq!(same.knot_count(), 12);
        for (a, b) in traj.knots.iter().zip(same.knots.iter()) {
            assert_eq!(a.time, b.time);
            assert_eq!(a.state, b.state);
        }
    }
}
