//! ds-results: durable storage for sweep results.
//!
//! A sweep writes its partial state after every angle so an interrupted
//! run can resume without re-solving. Files are flat human-readable JSON
//! maps keyed by the literal travel angle in radians; all writes go
//! through a temp-file-then-rename so a concurrent reader never sees a
//! torn document.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_config_hash;
pub use store::SweepStore;
pub use types::{SweepManifest, UNSOLVED_SENTINEL};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "store at {dir} was written for a different configuration (hash {found}, expected {expected})"
    )]
    ConfigMismatch {
        dir: String,
        expected: String,
        found: String,
    },
}
