//! Trajectory transcription: continuous optimal control to NLP.
//!
//! Decision vector layout: all knot states, then all knot inputs, then the
//! period and the average speed made good. Dynamics consistency uses
//! trapezoidal collocation between consecutive knots; periodicity ties the
//! last knot back to the first with the position advanced along the travel
//! direction. Building the NLP is a pure function of the inputs: identical
//! inputs produce an identical program.

use crate::error::{SolverError, SolverResult};
use crate::guess::{resample, straight_line_guess};
use crate::nlp::NlpProblem;
use crate::trajectory::{Knot, Trajectory, travel_direction};
use ds_core::TrajectoryConstraints;
use ds_glider::flight::wind_frame_axes;
use ds_glider::{Circulation, Glider, GliderState, reg_norm};
use ds_wind::WindModel;
use nalgebra::DVector;

/// Discretization settings.
#[derive(Clone, Copy, Debug)]
pub struct TranscriptionConfig {
    /// Number of knots
    pub knot_count: usize,
    /// Allowed period range as multiples of the period guess. The implied
    /// time-step bounds are this window divided by the knot spacing; a
    /// solved period pinned at either edge is reported as time-step
    /// saturation.
    pub period_window: (f64, f64),
    /// Fraction of the period window treated as "pinned at the bound"
    pub saturation_rel_tol: f64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            knot_count: 16,
            period_window: (0.5, 2.0),
            saturation_rel_tol: 1e-3,
        }
    }
}

/// Index arithmetic for the flat decision vector.
#[derive(Clone, Copy, Debug)]
pub struct VariableLayout {
    pub knot_count: usize,
}

impl VariableLayout {
    pub fn num_vars(&self) -> usize {
        9 * self.knot_count + 2
    }

    pub fn state_offset(&self, k: usize) -> usize {
        6 * k
    }

    pub fn input_offset(&self, k: usize) -> usize {
        6 * self.knot_count + 3 * k
    }

    pub fn period_index(&self) -> usize {
        9 * self.knot_count
    }

    pub fn avg_speed_index(&self) -> usize {
        9 * self.knot_count + 1
    }

    pub fn state(&self, z: &DVector<f64>, k: usize) -> GliderState {
        let offset = self.state_offset(k);
        GliderState::from_fn(|i, _| z[offset + i])
    }

    pub fn input(&self, z: &DVector<f64>, k: usize) -> Circulation {
        let offset = self.input_offset(k);
        Circulation::from_fn(|i, _| z[offset + i])
    }

    /// Pack a trajectory with a matching knot count into a decision vector.
    pub fn encode(&self, trajectory: &Trajectory) -> DVector<f64> {
        debug_assert_eq!(trajectory.knot_count(), self.knot_count);
        let mut z = DVector::zeros(self.num_vars());
        for (k, knot) in trajectory.knots.iter().enumerate() {
            z.rows_mut(self.state_offset(k), 6)
                .copy_from(&knot.state);
            z.rows_mut(self.input_offset(k), 3)
                .copy_from(&knot.input);
        }
        z[self.period_index()] = trajectory.period;
        z[self.avg_speed_index()] = trajectory.avg_speed;
        z
    }

    /// Unpack a decision vector into a trajectory with uniform knot times.
    pub fn decode(&self, z: &DVector<f64>) -> Trajectory {
        let period = z[self.period_index()];
        let avg_speed = z[self.avg_speed_index()];
        let dt = period / (self.knot_count - 1) as f64;
        let knots = (0..self.knot_count)
            .map(|k| Knot {
                time: k as f64 * dt,
                state: self.state(z, k),
                input: self.input(z, k),
            })
            .collect();
        Trajectory {
            knots,
            period,
            avg_speed,
        }
    }
}

/// One trajectory-optimization instance for a fixed travel angle.
pub struct TrajectoryProblem<'a> {
    glider: &'a Glider,
    wind: &'a dyn WindModel,
    constraints: &'a TrajectoryConstraints,
    travel_angle: f64,
    period_guess: f64,
    avg_speed_guess: f64,
    config: TranscriptionConfig,
}

impl<'a> TrajectoryProblem<'a> {
    pub fn new(
        glider: &'a Glider,
        wind: &'a dyn WindModel,
        constraints: &'a TrajectoryConstraints,
        travel_angle: f64,
        period_guess: f64,
        avg_speed_guess: f64,
        config: TranscriptionConfig,
    ) -> SolverResult<Self> {
        constraints.validate()?;
        if config.knot_count < 3 {
            return Err(SolverError::ProblemSetup {
                what: format!("knot_count must be at least 3, got {}", config.knot_count),
            });
        }
        let (window_lo, window_hi) = config.period_window;
        if !(window_lo > 0.0 && window_hi > window_lo) {
            return Err(SolverError::ProblemSetup {
                what: format!("invalid period window ({window_lo}, {window_hi})"),
            });
        }
        for (what, value) in [
            ("travel_angle", travel_angle),
            ("period_guess", period_guess),
            ("avg_speed_guess", avg_speed_guess),
        ] {
            if !value.is_finite() {
                return Err(SolverError::ProblemSetup {
                    what: format!("{what} must be finite, got {value}"),
                });
            }
        }
        if period_guess <= 0.0 || avg_speed_guess <= 0.0 {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "period and speed guesses must be positive, got {period_guess} and {avg_speed_guess}"
                ),
            });
        }
        Ok(Self {
            glider,
            wind,
            constraints,
            travel_angle,
            period_guess,
            avg_speed_guess,
            config,
        })
    }

    pub fn layout(&self) -> VariableLayout {
        VariableLayout {
            knot_count: self.config.knot_count,
        }
    }

    pub fn config(&self) -> &TranscriptionConfig {
        &self.config
    }

    /// Period bounds implied by the period guess and the window.
    pub fn period_bounds(&self) -> (f64, f64) {
        (
            self.config.period_window.0 * self.period_guess,
            self.config.period_window.1 * self.period_guess,
        )
    }

    /// Discretization time-step bounds implied by the period bounds.
    pub fn time_step_bounds(&self) -> (f64, f64) {
        let spans = (self.config.knot_count - 1) as f64;
        let (lo, hi) = self.period_bounds();
        (lo / spans, hi / spans)
    }

    pub fn num_equalities(&self) -> usize {
        // 6 collocation defects per interval, 6 periodicity rows, 2 anchor rows.
        6 * self.config.knot_count + 2
    }

    pub fn num_inequalities(&self) -> usize {
        // Per knot: lift coefficient band (2), load factor (1), bank cone (1);
        // plus the minimum-travel row.
        4 * self.config.knot_count + 1
    }

    /// Build the NLP. Pure: no side effects, deterministic for fixed inputs.
    pub fn build(&self) -> NlpProblem<'a> {
        let glider = self.glider;
        let wind = self.wind;
        let constraints = *self.constraints;
        let travel_angle = self.travel_angle;
        let layout = self.layout();
        let n = layout.knot_count;
        let num_eq = self.num_equalities();
        let num_ineq = self.num_inequalities();
        let (period_lo, period_hi) = self.period_bounds();

        let equality = move |z: &DVector<f64>| -> DVector<f64> {
            let period = z[layout.period_index()];
            let avg_speed = z[layout.avg_speed_index()];
            let h = period / (n - 1) as f64;

            let derivatives: Vec<GliderState> = (0..n)
                .map(|k| {
                    glider.continuous_dynamics(&layout.state(z, k), &layout.input(z, k), wind)
                })
                .collect();

            let mut out = DVector::zeros(num_eq);
            let mut row = 0;
            for k in 0..n - 1 {
                let defect = layout.state(z, k + 1)
                    - layout.state(z, k)
                    - (derivatives[k] + derivatives[k + 1]) * (0.5 * h);
                out.rows_mut(row, 6).copy_from(&defect);
                row += 6;
            }

            let first = layout.state(z, 0);
            let last = layout.state(z, n - 1);
            let wrap = last - first;
            out.rows_mut(row, 3)
                .copy_from(&wrap.fixed_rows::<3>(3).into_owned());
            row += 3;
            let advance = travel_direction(travel_angle) * (period * avg_speed);
            let pos_defect = wrap.fixed_rows::<3>(0).into_owned() - advance;
            out.rows_mut(row, 3).copy_from(&pos_defect);
            row += 3;

            // Anchor the first knot horizontally; the problem is otherwise
            // translation invariant.
            out[row] = first[0];
            out[row + 1] = first[1];
            out
        };

        let inequality = move |z: &DVector<f64>| -> DVector<f64> {
            let period = z[layout.period_index()];
            let avg_speed = z[layout.avg_speed_index()];
            let cos_max_bank = constraints.max_bank_angle.cos();

            let mut out = DVector::zeros(num_ineq);
            let mut row = 0;
            for k in 0..n {
                let state = layout.state(z, k);
                let input = layout.input(z, k);
                let v_rel = glider.relative_velocity(&state, wind);

                let c_l = glider.lift_coefficient(&v_rel, &input);
                out[row] = c_l - constraints.min_lift_coeff;
                out[row + 1] = constraints.max_lift_coeff - c_l;

                out[row + 2] = constraints.max_load_factor - glider.load_factor(&v_rel, &input);

                let lift = glider.lift_force(&v_rel, &input);
                let (_, up) = wind_frame_axes(&v_rel);
                out[row + 3] = lift.dot(&up) - cos_max_bank * reg_norm(&lift);
                row += 4;
            }

            out[row] = period * avg_speed - constraints.min_travel_distance;
            out
        };

        let mut lower = DVector::from_element(layout.num_vars(), f64::NEG_INFINITY);
        let mut upper = DVector::from_element(layout.num_vars(), f64::INFINITY);
        for k in 0..n {
            let z_index = layout.state_offset(k) + 2;
            lower[z_index] = constraints.min_height;
            upper[z_index] = constraints.max_height;
        }
        lower[layout.period_index()] = period_lo;
        upper[layout.period_index()] = period_hi;
        lower[layout.avg_speed_index()] = 0.0;

        let avg_speed_index = layout.avg_speed_index();
        NlpProblem {
            num_vars: layout.num_vars(),
            // Maximize the speed made good along the travel direction.
            objective: Box::new(move |z: &DVector<f64>| -z[avg_speed_index]),
            equality: Box::new(equality),
            num_equalities: num_eq,
            inequality: Box::new(inequality),
            num_inequalities: num_ineq,
            lower,
            upper,
        }
    }

    /// Initial decision vector: the warm start (resampled to this knot
    /// count, period clamped into the window) or the straight-line guess.
    pub fn initial_vector(&self, warm_start: Option<&Trajectory>) -> DVector<f64> {
        let layout = self.layout();
        let (period_lo, period_hi) = self.period_bounds();
        let trajectory = match warm_start {
            Some(warm) => {
                let mut resampled = resample(warm, layout.knot_count);
                resampled.period = resampled.period.clamp(period_lo, period_hi);
                resampled.avg_speed = resampled.avg_speed.max(0.0);
                resampled
            }
            None => straight_line_guess(
                self.glider,
                self.wind,
                self.constraints,
                self.travel_angle,
                self.period_guess.clamp(period_lo, period_hi),
                self.avg_speed_guess,
                layout.knot_count,
            ),
        };
        layout.encode(&trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_core::PhysicalParameters;
    use ds_wind::{LogarithmicWind, WindProfileConfig};

    struct Fixture {
        glider: Glider,
        wind: LogarithmicWind,
        constraints: TrajectoryConstraints,
    }

    fn fixture() -> Fixture {
        Fixture {
            glider: Glider::new(PhysicalParameters::default()).unwrap(),
            wind: LogarithmicWind::new(WindProfileConfig::default()),
            constraints: TrajectoryConstraints::default(),
        }
    }

    fn problem(fx: &Fixture) -> TrajectoryProblem<'_> {
        TrajectoryProblem::new(
            &fx.glider,
            &fx.wind,
            &fx.constraints,
            0.4,
            8.0,
            12.0,
            TranscriptionConfig {
                knot_count: 8,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn declared_dimensions_match_closures() {
        let fx = fixture();
        let tp = problem(&fx);
        let nlp = tp.build();
        let z = tp.initial_vector(None);
        assert_eq!(z.len(), nlp.num_vars);
        assert_eq!((nlp.equality)(&z).len(), nlp.num_equalities);
        assert_eq!((nlp.inequality)(&z).len(), nlp.num_inequalities);
        nlp.validate(&z).unwrap();
    }

    #[test]
    fn transcription_is_deterministic() {
        let fx = fixture();
        let tp1 = problem(&fx);
        let tp2 = problem(&fx);
        let nlp1 = tp1.build();
        let nlp2 = tp2.build();

        assert_eq!(nlp1.num_vars, nlp2.num_vars);
        assert_eq!(nlp1.num_equalities, nlp2.num_equalities);
        assert_eq!(nlp1.num_inequalities, nlp2.num_inequalities);
        assert_eq!(nlp1.lower, nlp2.lower);
        assert_eq!(nlp1.upper, nlp2.upper);

        let z = tp1.initial_vector(None);
        assert_eq!(z, tp2.initial_vector(None));
        assert_eq!((nlp1.equality)(&z), (nlp2.equality)(&z));
        assert_eq!((nlp1.inequality)(&z), (nlp2.inequality)(&z));
        assert_eq!((nlp1.objective)(&z), (nlp2.objective)(&z));
    }

    #[test]
    fn straight_line_guess_satisfies_periodicity_rows() {
        let fx = fixture();
        let tp = problem(&fx);
        let nlp = tp.build();
        let z = tp.initial_vector(None);
        let c = (nlp.equality)(&z);
        // The last 8 rows are velocity wrap, position wrap and the anchor;
        // the straight-line guess satisfies all of them by construction.
        let n_eq = nlp.num_equalities;
        for row in (n_eq - 8)..n_eq {
            assert!(c[row].abs() < 1e-9, "row {row} = {}", c[row]);
        }
    }

    #[test]
    fn height_bounds_apply_to_every_knot() {
        let fx = fixture();
        let tp = problem(&fx);
        let nlp = tp.build();
        let layout = tp.layout();
        for k in 0..layout.knot_count {
            let idx = layout.state_offset(k) + 2;
            assert_eq!(nlp.lower[idx], fx.constraints.min_height);
            assert_eq!(nlp.upper[idx], fx.constraints.max_height);
        }
        assert_eq!(nlp.lower[layout.period_index()], 4.0);
        assert_eq!(nlp.upper[layout.period_index()], 16.0);
    }

    #[test]
    fn encode_decode_round_trip() {
        let fx = fixture();
        let tp = problem(&fx);
        let layout = tp.layout();
        let z = tp.initial_vector(None);
        let traj = layout.decode(&z);
        assert_eq!(traj.knot_count(), layout.knot_count);
        let z2 = layout.encode(&traj);
        assert_eq!(z, z2);
    }

    #[test]
    fn warm_start_with_mismatched_knots_is_resampled() {
        let fx = fixture();
        let tp = problem(&fx);
        let warm = straight_line_guess(&fx.glider, &fx.wind, &fx.constraints, 0.4, 30.0, 9.0, 21);
        let z = tp.initial_vector(Some(&warm));
        assert_eq!(z.len(), tp.layout().num_vars());
        // The warm period 30 s is outside the window and gets clamped.
        assert_eq!(z[tp.layout().period_index()], 16.0);
    }

    #[test]
    fn rejects_bad_setup() {
        let fx = fixture();
        let too_few = TrajectoryProblem::new(
            &fx.glider,
            &fx.wind,
            &fx.constraints,
            0.0,
            8.0,
            12.0,
            TranscriptionConfig {
                knot_count: 2,
                ..Default::default()
            },
        );
        assert!(too_few.is_err());

        let bad_guess = TrajectoryProblem::new(
            &fx.glider,
            &fx.wind,
            &fx.constraints,
            0.0,
            -1.0,
            12.0,
            TranscriptionConfig::default(),
        );
        assert!(bad_guess.is_err());
    }
}
