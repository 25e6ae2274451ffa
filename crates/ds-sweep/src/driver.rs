//! The continuation driver.
//!
//! Per-angle retry states: TRY, then on the outcome either SUCCESS (record
//! and advance), a period-guess correction (time-step saturation), SHRINK
//! (local infeasibility), RETRY_FROM_SCRATCH (period floor crossed while
//! warm starting) or GIVE_UP (speed floor crossed; record the sentinel).
//! One angle's failure never halts the sweep.

use crate::config::{RetryPolicy, SweepConfig};
use crate::error::SweepResult;
use crate::optimizer::{SolveRequest, TrajectoryOptimizer};
use ds_results::{SweepStore, UNSOLVED_SENTINEL};
use ds_solver::{SolveOutcome, TimeStepSaturation, Trajectory, TrajectorySolution};
use tracing::{info, warn};

/// Counts reported after a sweep pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Angles solved in this pass
    pub solved: usize,
    /// Angles recorded as unsolvable in this pass
    pub unsolved: usize,
    /// Angles already present in the store (resume)
    pub skipped: usize,
}

enum AngleResult {
    Solved(Box<TrajectorySolution>),
    GaveUp,
}

/// Drives the trajectory optimization across the angle sweep.
///
/// Owns the only cross-iteration mutable state: the last successful
/// trajectory (next warm start) and the store handle.
pub struct SweepDriver<'a, O: TrajectoryOptimizer> {
    optimizer: &'a O,
    store: &'a mut SweepStore,
    config: SweepConfig,
    policy: RetryPolicy,
}

impl<'a, O: TrajectoryOptimizer> SweepDriver<'a, O> {
    pub fn new(
        optimizer: &'a O,
        store: &'a mut SweepStore,
        config: SweepConfig,
        policy: RetryPolicy,
    ) -> SweepResult<Self> {
        config.validate()?;
        policy.validate()?;
        Ok(Self {
            optimizer,
            store,
            config,
            policy,
        })
    }

    /// Run one pass over the sweep. Angles already in the store are
    /// skipped, so rerunning after an interruption continues where the
    /// previous process stopped.
    pub fn run(&mut self) -> SweepResult<SweepSummary> {
        let mut summary = SweepSummary::default();
        let mut warm_start: Option<Trajectory> = None;

        for travel_angle in self.config.travel_angles() {
            if self.store.is_recorded(travel_angle) {
                info!(travel_angle, "angle already recorded, skipping");
                summary.skipped += 1;
                continue;
            }

            match self.solve_angle(travel_angle, warm_start.take())? {
                AngleResult::Solved(solution) => {
                    info!(
                        travel_angle,
                        avg_speed = solution.avg_speed,
                        period = solution.period,
                        "angle solved"
                    );
                    self.store
                        .record(travel_angle, solution.avg_speed, solution.period)?;
                    warm_start = Some(solution.trajectory);
                    summary.solved += 1;
                }
                AngleResult::GaveUp => {
                    warn!(travel_angle, "no feasible trajectory, recording as unsolved");
                    self.store
                        .record(travel_angle, UNSOLVED_SENTINEL, UNSOLVED_SENTINEL)?;
                    warm_start = None;
                    summary.unsolved += 1;
                }
            }
        }

        Ok(summary)
    }

    fn solve_angle(
        &mut self,
        travel_angle: f64,
        warm_start: Option<Trajectory>,
    ) -> SweepResult<AngleResult> {
        let mut period_guess = self.config.period_guess;
        let mut avg_speed_guess = self.config.avg_speed_guess;
        let mut warm_start = warm_start;

        for _attempt in 0..self.policy.max_attempts {
            let request = SolveRequest {
                travel_angle,
                period_guess,
                avg_speed_guess,
                warm_start: warm_start.clone(),
            };

            match self.optimizer.optimize(&request)? {
                SolveOutcome::Solved(solution) => match solution.saturation {
                    TimeStepSaturation::None => {
                        return Ok(AngleResult::Solved(Box::new(solution)));
                    }
                    TimeStepSaturation::Upper => {
                        warn!(travel_angle, period_guess, "time step at max, increasing period");
                        period_guess *= self.policy.saturation_grow;
                        avg_speed_guess = self.config.avg_speed_guess;
                        warm_start = Some(solution.trajectory);
                    }
                    TimeStepSaturation::Lower => {
                        warn!(travel_angle, period_guess, "time step at min, decreasing period");
                        period_guess *= self.policy.saturation_shrink;
                        warm_start = Some(solution.trajectory);
                    }
                },
                SolveOutcome::Infeasible { reason } => {
                    warn!(travel_angle, period_guess, %reason, "no solution found, decreasing period");
                    period_guess *= self.policy.failure_shrink;

                    if period_guess < self.policy.period_floor {
                        if warm_start.is_some() {
                            // Warm starting has clearly failed; give the
                            // straight-line guess a fair chance.
                            warn!(travel_angle, "period floor crossed, retrying from scratch");
                            warm_start = None;
                            period_guess = self.config.period_guess;
                        } else {
                            avg_speed_guess *= self.policy.speed_shrink;
                            period_guess = self.config.period_guess;
                            if avg_speed_guess < self.policy.speed_floor {
                                return Ok(AngleResult::GaveUp);
                            }
                            warn!(
                                travel_angle,
                                avg_speed_guess, "retrying with a slower speed guess"
                            );
                        }
                    }
                }
            }
        }

        warn!(
            travel_angle,
            attempts = self.policy.max_attempts,
            "attempt cap reached"
        );
        Ok(AngleResult::GaveUp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RetryPolicy, SweepConfig};
    use ds_glider::GliderState;
    use ds_results::SweepManifest;
    use ds_solver::{Knot, SolveDiagnostics, SolveOutcome, TimeStepSaturation};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        dir.push(format!("{}_{}", prefix, nanos));
        dir
    }

    fn store(prefix: &str) -> SweepStore {
        let manifest = SweepManifest::new("test-hash".to_string(), "0.1.0");
        SweepStore::open_or_create(&unique_temp_dir(prefix), &manifest).unwrap()
    }

    fn dummy_trajectory(period: f64, avg_speed: f64) -> Trajectory {
        let knot = |t: f64| Knot {
            time: t,
            state: GliderState::zeros(),
            input: ds_glider::Circulation::zeros(),
        };
        Trajectory {
            knots: vec![knot(0.0), knot(period)],
            period,
            avg_speed,
        }
    }

    fn solved(saturation: TimeStepSaturation) -> SolveOutcome {
        SolveOutcome::Solved(TrajectorySolution {
            trajectory: dummy_trajectory(6.0, 11.0),
            avg_speed: 11.0,
            period: 6.0,
            saturation,
            diagnostics: SolveDiagnostics {
                outer_iterations: 3,
                feasibility: 1e-8,
                stationarity: 1e-6,
            },
        })
    }

    fn infeasible() -> SolveOutcome {
        SolveOutcome::Infeasible {
            reason: "did not converge".to_string(),
        }
    }

    /// Replays a fixed outcome script and records every request it saw.
    struct ScriptedOptimizer {
        outcomes: RefCell<VecDeque<SolveOutcome>>,
        requests: RefCell<Vec<SolveRequest>>,
    }

    impl ScriptedOptimizer {
        fn new(outcomes: Vec<SolveOutcome>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<SolveRequest> {
            self.requests.borrow().clone()
        }
    }

    impl TrajectoryOptimizer for ScriptedOptimizer {
        fn optimize(&self, request: &SolveRequest) -> SweepResult<SolveOutcome> {
            self.requests.borrow_mut().push(request.clone());
            Ok(self
                .outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(infeasible))
        }
    }

    fn config(angle_count: usize) -> SweepConfig {
        SweepConfig {
            start_angle: 0.0,
            angle_count,
            period_guess: 8.0,
            avg_speed_guess: 12.0,
        }
    }

    #[test]
    fn success_records_and_propagates_warm_start() {
        let optimizer = ScriptedOptimizer::new(vec![
            solved(TimeStepSaturation::None),
            solved(TimeStepSaturation::None),
            solved(TimeStepSaturation::None),
        ]);
        let mut store = store("ds_sweep_success");
        let mut driver =
            SweepDriver::new(&optimizer, &mut store, config(3), RetryPolicy::default()).unwrap();

        let summary = driver.run().unwrap();
        assert_eq!(summary.solved, 3);
        assert_eq!(summary.unsolved, 0);
        assert_eq!(store.len(), 3);

        let requests = optimizer.requests();
        assert!(requests[0].warm_start.is_none());
        assert!(requests[1].warm_start.is_some());
        assert!(requests[2].warm_start.is_some());
    }

    #[test]
    fn upper_saturation_grows_the_period_guess() {
        let optimizer = ScriptedOptimizer::new(vec![
            solved(TimeStepSaturation::Upper),
            solved(TimeStepSaturation::None),
        ]);
        let mut store = store("ds_sweep_saturation");
        let mut driver =
            SweepDriver::new(&optimizer, &mut store, config(1), RetryPolicy::default()).unwrap();

        let summary = driver.run().unwrap();
        assert_eq!(summary.solved, 1);

        let requests = optimizer.requests();
        assert_eq!(requests.len(), 2);
        assert!((requests[1].period_guess - 8.0 * 1.1).abs() < 1e-12);
        // The saturated solution itself seeds the retry.
        assert!(requests[1].warm_start.is_some());
    }

    #[test]
    fn lower_saturation_shrinks_the_period_guess() {
        let optimizer = ScriptedOptimizer::new(vec![
            solved(TimeStepSaturation::Lower),
            solved(TimeStepSaturation::None),
        ]);
        let mut store = store("ds_sweep_saturation_lower");
        let mut driver =
            SweepDriver::new(&optimizer, &mut store, config(1), RetryPolicy::default()).unwrap();

        driver.run().unwrap();
        let requests = optimizer.requests();
        assert!((requests[1].period_guess - 8.0 * 0.9).abs() < 1e-12);
    }

    #[test]
    fn period_floor_abandons_warm_start_for_straight_line() {
        // First angle solves and becomes the warm start. The second angle
        // fails until the period guess crosses the floor; the next attempt
        // must run from scratch with the reset period guess.
        let mut outcomes = vec![solved(TimeStepSaturation::None)];
        outcomes.extend(std::iter::repeat_with(infeasible).take(14));
        outcomes.push(solved(TimeStepSaturation::None));
        let optimizer = ScriptedOptimizer::new(outcomes);

        let mut store = store("ds_sweep_scratch");
        let mut driver =
            SweepDriver::new(&optimizer, &mut store, config(2), RetryPolicy::default()).unwrap();

        let summary = driver.run().unwrap();
        assert_eq!(summary.solved, 2);

        let requests = optimizer.requests();
        assert_eq!(requests.len(), 16);
        // Attempts 1..=14 warm-start from the first angle's solution with a
        // shrinking period guess.
        for request in &requests[1..15] {
            assert!(request.warm_start.is_some());
        }
        assert!(requests[14].period_guess < requests[1].period_guess);
        // The 15th attempt for the second angle is the from-scratch retry.
        let scratch = &requests[15];
        assert!(scratch.warm_start.is_none(), "straight-line guess expected");
        assert!((scratch.period_guess - 8.0).abs() < 1e-12);
    }

    #[test]
    fn gives_up_with_sentinel_when_speed_floor_is_crossed() {
        let optimizer = ScriptedOptimizer::new(Vec::new());
        let mut store = store("ds_sweep_giveup");
        let policy = RetryPolicy {
            // One failure per cycle crosses the period floor immediately.
            period_floor: 7.9,
            speed_shrink: 0.5,
            speed_floor: 0.3,
            ..Default::default()
        };
        let config = SweepConfig {
            avg_speed_guess: 0.5,
            ..config(1)
        };
        let mut driver = SweepDriver::new(&optimizer, &mut store, config, policy).unwrap();

        let summary = driver.run().unwrap();
        assert_eq!(summary.unsolved, 1);
        assert_eq!(summary.solved, 0);

        let (speed, period) = store.get(0.0).unwrap();
        assert_eq!(speed, UNSOLVED_SENTINEL);
        assert_eq!(period, UNSOLVED_SENTINEL);

        // Sweep continues to completion: the run itself succeeded.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn give_up_does_not_halt_the_remaining_sweep() {
        // Angle 1 gives up instantly (speed floor), angles 2 and 3 solve.
        let optimizer = ScriptedOptimizer::new(vec![
            infeasible(),
            infeasible(),
            solved(TimeStepSaturation::None),
            solved(TimeStepSaturation::None),
        ]);
        let mut store = store("ds_sweep_continue");
        let policy = RetryPolicy {
            period_floor: 7.9,
            speed_shrink: 0.5,
            speed_floor: 0.3,
            ..Default::default()
        };
        let config = SweepConfig {
            avg_speed_guess: 1.0,
            ..config(3)
        };
        let mut driver = SweepDriver::new(&optimizer, &mut store, config, policy).unwrap();

        let summary = driver.run().unwrap();
        assert_eq!(summary.unsolved, 1);
        assert_eq!(summary.solved, 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn resume_skips_recorded_angles() {
        let manifest = SweepManifest::new("resume-hash".to_string(), "0.1.0");
        let dir = unique_temp_dir("ds_sweep_resume");
        let config = config(3);
        let angles = config.travel_angles();

        // Simulate an interrupted sweep that finished the first angle.
        {
            let mut store = SweepStore::open_or_create(&dir, &manifest).unwrap();
            store.record(angles[0], 10.5, 6.0).unwrap();
        }

        let optimizer = ScriptedOptimizer::new(vec![
            solved(TimeStepSaturation::None),
            solved(TimeStepSaturation::None),
        ]);
        let mut store = SweepStore::open_or_create(&dir, &manifest).unwrap();
        let mut driver =
            SweepDriver::new(&optimizer, &mut store, config, RetryPolicy::default()).unwrap();

        let summary = driver.run().unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.solved, 2);

        // The resumed pass never re-solved the recorded angle.
        for request in optimizer.requests() {
            assert!((request.travel_angle - angles[0]).abs() > 1e-9);
        }

        // The store still holds the pre-interruption result untouched.
        let (speed, period) = store.get(angles[0]).unwrap();
        assert!((speed - 10.5).abs() < 1e-12);
        assert!((period - 6.0).abs() < 1e-12);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn attempt_cap_is_a_backstop() {
        // Endless upper saturation would otherwise loop forever.
        let outcomes = std::iter::repeat_with(|| solved(TimeStepSaturation::Upper))
            .take(10)
            .collect();
        let optimizer = ScriptedOptimizer::new(outcomes);
        let mut store = store("ds_sweep_cap");
        let policy = RetryPolicy {
            max_attempts: 5,
            ..Default::default()
        };
        let mut driver = SweepDriver::new(&optimizer, &mut store, config(1), policy).unwrap();

        let summary = driver.run().unwrap();
        assert_eq!(summary.unsolved, 1);
        assert_eq!(optimizer.requests().len(), 5);
    }
}
