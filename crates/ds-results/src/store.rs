//! Sweep storage API.

use crate::types::SweepManifest;
use crate::{ResultsError, ResultsResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";
const SPEEDS_FILE: &str = "sweep_speeds.json";
const PERIODS_FILE: &str = "sweep_periods.json";

/// Durable store for per-angle sweep results.
///
/// Keeps an in-memory copy of both maps and rewrites the files after every
/// recorded angle. Keys are the literal travel angles in radians.
#[derive(Debug)]
pub struct SweepStore {
    dir: PathBuf,
    speeds: BTreeMap<String, f64>,
    periods: BTreeMap<String, f64>,
}

impl SweepStore {
    /// Open an existing store (resume) or create a fresh one.
    ///
    /// An existing store is only reopened when its manifest hash matches
    /// the supplied manifest; mixing results from different configurations
    /// is refused.
    pub fn open_or_create(dir: &Path, manifest: &SweepManifest) -> ResultsResult<Self> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if manifest_path.exists() {
            let existing: SweepManifest =
                serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;
            if existing.config_hash != manifest.config_hash {
                return Err(ResultsError::ConfigMismatch {
                    dir: dir.display().to_string(),
                    expected: manifest.config_hash.clone(),
                    found: existing.config_hash,
                });
            }
            let speeds = read_map(&dir.join(SPEEDS_FILE))?;
            let periods = read_map(&dir.join(PERIODS_FILE))?;
            return Ok(Self {
                dir: dir.to_path_buf(),
                speeds,
                periods,
            });
        }

        fs::create_dir_all(dir)?;
        let store = Self {
            dir: dir.to_path_buf(),
            speeds: BTreeMap::new(),
            periods: BTreeMap::new(),
        };
        write_atomic(&manifest_path, &serde_json::to_string_pretty(manifest)?)?;
        store.persist()?;
        Ok(store)
    }

    /// Open an existing store read-only style, returning its manifest.
    pub fn open(dir: &Path) -> ResultsResult<(Self, SweepManifest)> {
        let manifest: SweepManifest =
            serde_json::from_str(&fs::read_to_string(dir.join(MANIFEST_FILE))?)?;
        let speeds = read_map(&dir.join(SPEEDS_FILE))?;
        let periods = read_map(&dir.join(PERIODS_FILE))?;
        Ok((
            Self {
                dir: dir.to_path_buf(),
                speeds,
                periods,
            },
            manifest,
        ))
    }

    /// Literal-radians key for an angle.
    pub fn angle_key(angle: f64) -> String {
        format!("{angle}")
    }

    /// Record one angle's result and persist both maps durably.
    pub fn record(&mut self, angle: f64, avg_speed: f64, period: f64) -> ResultsResult<()> {
        let key = Self::angle_key(angle);
        self.speeds.insert(key.clone(), avg_speed);
        self.periods.insert(key, period);
        self.persist()
    }

    pub fn is_recorded(&self, angle: f64) -> bool {
        self.speeds.contains_key(&Self::angle_key(angle))
    }

    pub fn get(&self, angle: f64) -> Option<(f64, f64)> {
        let key = Self::angle_key(angle);
        match (self.speeds.get(&key), self.periods.get(&key)) {
            (Some(&speed), Some(&period)) => Some((speed, period)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    /// All recorded (angle, speed, period) entries sorted by angle.
    pub fn entries(&self) -> Vec<(f64, f64, f64)> {
        let mut out: Vec<(f64, f64, f64)> = self
            .speeds
            .iter()
            .filter_map(|(key, &speed)| {
                let angle: f64 = key.parse().ok()?;
                let period = *self.periods.get(key)?;
                Some((angle, speed, period))
            })
            .collect();
        out.sort_by(|a, b| a.0.total_cmp(&b.0));
        out
    }

    fn persist(&self) -> ResultsResult<()> {
        write_atomic(
            &self.dir.join(SPEEDS_FILE),
            &serde_json::to_string_pretty(&self.speeds)?,
        )?;
        write_atomic(
            &self.dir.join(PERIODS_FILE),
            &serde_json::to_string_pretty(&self.periods)?,
        )?;
        Ok(())
    }
}

fn read_map(path: &Path) -> ResultsResult<BTreeMap<String, f64>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Write the new content next to the target and rename it into place, so
/// a reader never observes a partially written file.
fn write_atomic(path: &Path, content: &str) -> ResultsResult<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
