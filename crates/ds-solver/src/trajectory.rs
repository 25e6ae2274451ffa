//! Solved-trajectory representation.

use ds_glider::{Circulation, GliderState};
use nalgebra::Vector3;

/// Unit vector of the desired travel direction, measured from north (+y)
/// toward east (+x).
pub fn travel_direction(travel_angle: f64) -> Vector3<f64> {
    Vector3::new(travel_angle.sin(), travel_angle.cos(), 0.0)
}

/// One discrete sample of the trajectory.
#[derive(Clone, Copy, Debug)]
pub struct Knot {
    /// Time since the trajectory start [s]
    pub time: f64,
    /// Full state at this knot
    pub state: GliderState,
    /// Circulation input at this knot
    pub input: Circulation,
}

/// An ordered sequence of knots plus the trajectory period.
///
/// Produced by one solver invocation and immutable afterwards; a new solve
/// always produces a new trajectory.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub knots: Vec<Knot>,
    /// Trajectory period [s]
    pub period: f64,
    /// Average speed made good along the travel direction [m/s]
    pub avg_speed: f64,
}

impl Trajectory {
    pub fn knot_count(&self) -> usize {
        self.knots.len()
    }

    /// Net position change between the first and last knot.
    pub fn displacement(&self) -> Vector3<f64> {
        let first = self.knots.first().expect("trajectory has no knots");
        let last = self.knots.last().expect("trajectory has no knots");
        (last.state - first.state).fixed_rows::<3>(0).into_owned()
    }

    /// Worst-case violation of the periodicity condition: velocity must
    /// wrap exactly and position must advance by period * avg_speed along
    /// the travel direction.
    pub fn periodicity_error(&self, travel_angle: f64) -> f64 {
        let first = self.knots.first().expect("trajectory has no knots");
        let last = self.knots.last().expect("trajectory has no knots");
        let expected = travel_direction(travel_angle) * (self.period * self.avg_speed);
        let pos_err = (self.displacement() - expected).amax();
        let vel_err = (last.state - first.state).fixed_rows::<3>(3).amax();
        pos_err.max(vel_err)
    }

    /// Linear interpolation of state and input at time t, clamped to the
    /// knot range.
    pub fn sample(&self, t: f64) -> (GliderState, Circulation) {
        let first = self.knots.first().expect("trajectory has no knots");
        let last = self.knots.last().expect("trajectory has no knots");
        if t <= first.time {
            return (first.state, first.input);
        }
        if t >= last.time {
            return (last.state, last.input);
        }
        for pair in self.knots.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t <= b.time {
                let span = b.time - a.time;
                let alpha = if span > 0.0 { (t - a.time) / span } else { 0.0 };
                let state = a.state + (b.state - a.state) * alpha;
                let input = a.input + (b.input - a.input) * alpha;
                return (state, input);
            }
        }
        (last.state, last.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_knot_trajectory() -> Trajectory {
        let mut s0 = GliderState::zeros();
        s0[2] = 10.0;
        let mut s1 = GliderState::zeros();
        s1[0] = 4.0;
        s1[2] = 10.0;
        Trajectory {
            knots: vec![
                Knot {
                    time: 0.0,
                    state: s0,
                    input: Circulation::zeros(),
                },
                Knot {
                    time: 2.0,
                    state: s1,
                    input: Circulation::new(1.0, 0.0, 0.0),
                },
            ],
            period: 2.0,
            avg_speed: 2.0,
        }
    }

    #[test]
    fn travel_direction_convention() {
        let north = travel_direction(0.0);
        assert!((north.x).abs() < 1e-12 && (north.y - 1.0).abs() < 1e-12);
        let east = travel_direction(std::f64::consts::FRAC_PI_2);
        assert!((east.x - 1.0).abs() < 1e-12 && east.y.abs() < 1e-12);
    }

    #[test]
    fn sample_interpolates_between_knots() {
        let traj = two_knot_trajectory();
        let (state, input) = traj.sample(1.0);
        assert!((state[0] - 2.0).abs() < 1e-12);
        assert!((state[2] - 10.0).abs() < 1e-12);
        assert!((input[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sample_clamps_outside_range() {
        let traj = two_knot_trajectory();
        let (before, _) = traj.sample(-1.0);
        let (after, _) = traj.sample(5.0);
        assert_eq!(before[0], 0.0);
        assert_eq!(after[0], 4.0);
    }

    #[test]
    fn periodicity_error_detects_eastward_displacement() {
        let traj = two_knot_trajectory();
        // Displacement is 4 m east; period * avg_speed = 4 along east.
        let err_east = traj.periodicity_error(std::f64::consts::FRAC_PI_2);
        assert!(err_east < 1e-12, "error {err_east}");
        let err_north = traj.periodicity_error(0.0);
        assert!(err_north > 3.9, "error {err_north}");
    }
}
