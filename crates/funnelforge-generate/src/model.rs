use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where run artifacts are written.
    pub out_dir: PathBuf,
    /// Number of users to fabricate.
    pub population: u64,
    /// Base epoch for signup instants; Poisson offsets are added to this date.
    pub base_date: NaiveDate,
    /// Seed for the shared draw stream.
    pub seed: u64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            population: 8000,
            base_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            seed: 42,
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub users_generated: u64,
    pub events_generated: u64,
    pub subscriptions_generated: u64,
    pub events_by_name: BTreeMap<String, u64>,
    pub duration_ms: u64,
    pub bytes_written: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64) -> Self {
        Self {
            run_id,
            seed,
            users_generated: 0,
            events_generated: 0,
            subscriptions_generated: 0,
            events_by_name: BTreeMap::new(),
            duration_ms: 0,
            bytes_written: 0,
        }
    }

    pub fn record_event(&mut self, name: &str) {
        self.events_generated += 1;
        *self.events_by_name.entry(name.to_string()).or_insert(0) += 1;
    }
}
