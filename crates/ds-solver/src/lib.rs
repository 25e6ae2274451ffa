//! Trajectory transcription and nonlinear-program solving for dynsoar.
//!
//! This crate turns the continuous glider dynamics plus path limits into a
//! finite-dimensional nonlinear program (trapezoidal collocation over N
//! knots, the period and the average speed as extra decision variables)
//! and solves it with an augmented-Lagrangian method. The `NlpProblem`
//! type is the solver boundary: anything honoring its contract can stand
//! behind it.

pub mod error;
pub mod gauss_newton;
pub mod guess;
pub mod jacobian;
pub mod nlp;
pub mod solve;
pub mod trajectory;
pub mod transcription;

pub use error::{SolverError, SolverResult};
pub use gauss_newton::{GaussNewtonConfig, GaussNewtonResult};
pub use guess::{resample, straight_line_guess};
pub use nlp::{NlpProblem, NlpSolution, NlpSolverConfig, solve_nlp};
pub use solve::{
    SolveDiagnostics, SolveOutcome, SolveSettings, TimeStepSaturation, TrajectorySolution,
    solve_trajectory,
};
pub use trajectory::{Knot, Trajectory, travel_direction};
pub use transcription::{TranscriptionConfig, TrajectoryProblem, VariableLayout};
