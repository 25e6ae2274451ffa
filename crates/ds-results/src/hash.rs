//! Content-based hashing of the sweep configuration.
//!
//! Resuming a sweep from a store written for different parameters would
//! silently mix incompatible results; the manifest carries this hash and
//! the store refuses to resume on a mismatch.

use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn compute_config_hash<T: Serialize>(config: &T, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
