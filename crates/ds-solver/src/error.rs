//! Error types for solver operations.

use ds_core::DsError;
use thiserror::Error;

/// Errors that can occur while transcribing or solving a trajectory problem.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error(transparent)]
    Config(#[from] DsError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for DsError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Config(inner) => inner,
            SolverError::ProblemSetup { what } => DsError::Config { what },
            SolverError::ConvergenceFailed { what } => DsError::Config {
                what: format!("solver did not converge: {what}"),
            },
            SolverError::Numeric { what } => DsError::Config {
                what: format!("numeric failure: {what}"),
            },
        }
    }
}
