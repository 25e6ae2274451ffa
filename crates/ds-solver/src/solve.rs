//! High-level trajectory solve.
//!
//! Wraps transcription + NLP solve into one call. Local infeasibility is a
//! first-class outcome (`SolveOutcome::Infeasible`); `Err` is reserved for
//! configuration and setup problems that invalidate every attempt.

use crate::error::{SolverError, SolverResult};
use crate::nlp::{NlpSolverConfig, solve_nlp};
use crate::trajectory::Trajectory;
use crate::transcription::{TranscriptionConfig, TrajectoryProblem};
use ds_core::TrajectoryConstraints;
use ds_glider::Glider;
use ds_wind::WindModel;
use tracing::debug;

/// Accepted violation of path constraints on a reported solution.
const PATH_TOL: f64 = 1e-3;

/// Accepted periodicity defect on a reported solution.
const PERIODICITY_TOL: f64 = 1e-4;

/// Whether the solved time step was pinned at a bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeStepSaturation {
    None,
    Lower,
    Upper,
}

/// Solver diagnostics attached to a solution.
#[derive(Clone, Copy, Debug)]
pub struct SolveDiagnostics {
    pub outer_iterations: usize,
    pub feasibility: f64,
    pub stationarity: f64,
}

/// A successfully solved trajectory with its headline numbers.
#[derive(Clone, Debug)]
pub struct TrajectorySolution {
    pub trajectory: Trajectory,
    pub avg_speed: f64,
    pub period: f64,
    pub saturation: TimeStepSaturation,
    pub diagnostics: SolveDiagnostics,
}

/// Outcome of one solve attempt.
#[derive(Clone, Debug)]
pub enum SolveOutcome {
    Solved(TrajectorySolution),
    Infeasible { reason: String },
}

/// Transcription plus NLP solver settings for one attempt.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolveSettings {
    pub transcription: TranscriptionConfig,
    pub nlp: NlpSolverConfig,
}

/// Solve one trajectory-optimization instance.
#[allow(clippy::too_many_arguments)]
pub fn solve_trajectory(
    glider: &Glider,
    wind: &dyn WindModel,
    constraints: &TrajectoryConstraints,
    travel_angle: f64,
    period_guess: f64,
    avg_speed_guess: f64,
    warm_start: Option<&Trajectory>,
    settings: &SolveSettings,
) -> SolverResult<SolveOutcome> {
    let problem = TrajectoryProblem::new(
        glider,
        wind,
        constraints,
        travel_angle,
        period_guess,
        avg_speed_guess,
        settings.transcription,
    )?;
    let nlp = problem.build();
    let z0 = problem.initial_vector(warm_start);

    let solution = match solve_nlp(&nlp, &z0, &settings.nlp) {
        Ok(solution) => solution,
        Err(SolverError::ConvergenceFailed { what }) => {
            debug!(travel_angle, reason = %what, "solve attempt infeasible");
            return Ok(SolveOutcome::Infeasible { reason: what });
        }
        Err(e) => return Err(e),
    };

    let trajectory = problem.layout().decode(&solution.x);
    if let Some(reason) = check_solution(glider, wind, constraints, travel_angle, &trajectory) {
        debug!(travel_angle, reason = %reason, "solution rejected by post-check");
        return Ok(SolveOutcome::Infeasible { reason });
    }

    let saturation = detect_saturation(
        trajectory.period,
        problem.period_bounds(),
        problem.config().saturation_rel_tol,
    );

    Ok(SolveOutcome::Solved(TrajectorySolution {
        avg_speed: trajectory.avg_speed,
        period: trajectory.period,
        trajectory,
        saturation,
        diagnostics: SolveDiagnostics {
            outer_iterations: solution.outer_iterations,
            feasibility: solution.feasibility,
            stationarity: solution.stationarity,
        },
    }))
}

/// Verify the decoded trajectory against the periodicity condition and the
/// path constraints. The NLP already enforced these; this guards against
/// accepting a solution whose violations slipped past the solver
/// tolerances.
fn check_solution(
    glider: &Glider,
    wind: &dyn WindModel,
    constraints: &TrajectoryConstraints,
    travel_angle: f64,
    trajectory: &Trajectory,
) -> Option<String> {
    if !(trajectory.period.is_finite() && trajectory.avg_speed.is_finite()) {
        return Some("non-finite period or speed".to_string());
    }
    if trajectory.avg_speed <= 0.0 {
        return Some(format!("non-positive average speed {}", trajectory.avg_speed));
    }

    let periodicity = trajectory.periodicity_error(travel_angle);
    if periodicity > PERIODICITY_TOL {
        return Some(format!("periodicity defect {periodicity:.3e}"));
    }

    for (k, knot) in trajectory.knots.iter().enumerate() {
        let z = knot.state[2];
        if z < constraints.min_height - PATH_TOL || z > constraints.max_height + PATH_TOL {
            return Some(format!("height {z:.3} out of band at knot {k}"));
        }

        let v_rel = glider.relative_velocity(&knot.state, wind);
        let c_l = glider.lift_coefficient(&v_rel, &knot.input);
        if c_l < constraints.min_lift_coeff - PATH_TOL
            || c_l > constraints.max_lift_coeff + PATH_TOL
        {
            return Some(format!("lift coefficient {c_l:.3} out of band at knot {k}"));
        }

        let load = glider.load_factor(&v_rel, &knot.input);
        if load > constraints.max_load_factor + PATH_TOL {
            return Some(format!("load factor {load:.3} over limit at knot {k}"));
        }

        let bank = glider.bank_angle(&v_rel, &knot.input);
        if bank.abs() > constraints.max_bank_angle + PATH_TOL {
            return Some(format!("bank angle {bank:.3} over limit at knot {k}"));
        }
    }

    None
}

fn detect_saturation(
    period: f64,
    (period_lo, period_hi): (f64, f64),
    rel_tol: f64,
) -> TimeStepSaturation {
    let margin = rel_tol * (period_hi - period_lo);
    if period <= period_lo + margin {
        TimeStepSaturation::Lower
    } else if period >= period_hi - margin {
        TimeStepSaturation::Upper
    } else {
        TimeStepSaturation::None
    }
}
