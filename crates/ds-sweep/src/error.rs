//! Error types for sweep orchestration.

use ds_core::DsError;
use ds_results::ResultsError;
use ds_solver::SolverError;
use thiserror::Error;

/// Errors that abort a sweep.
///
/// Per-angle solver infeasibility never appears here; the driver absorbs
/// it into retries. Only configuration problems and store I/O failures
/// propagate.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error(transparent)]
    Config(#[from] DsError),

    #[error("Solver setup error: {0}")]
    Solver(#[from] SolverError),

    #[error("Result store error: {0}")]
    Results(#[from] ResultsError),
}

pub type SweepResult<T> = Result<T, SweepError>;

impl From<SweepError> for DsError {
    fn from(e: SweepError) -> Self {
        match e {
            SweepError::Config(inner) => inner,
            SweepError::Solver(inner) => inner.into(),
            SweepError::Results(ResultsError::Io(io)) => DsError::Io(io),
            SweepError::Results(inner) => DsError::Config {
                what: format!("result store: {inner}"),
            },
        }
    }
}
