//! Result data types.

use serde::{Deserialize, Serialize};

/// Sentinel recorded for both speed and period when an angle could not be
/// solved after exhausting retries.
pub const UNSOLVED_SENTINEL: f64 = -1.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepManifest {
    pub created_at: String,
    pub solver_version: String,
    pub config_hash: String,
}

impl SweepManifest {
    pub fn new(config_hash: String, solver_version: &str) -> Self {
        Self {
            created_at: chrono::Utc::now().to_rfc3339(),
            solver_version: solver_version.to_string(),
            config_hash,
        }
    }
}
