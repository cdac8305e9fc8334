//! Result data types.

use serde::{Deserialize, Serialize};

use crate::extract::MonitoredVariables;

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    pub timestamp: String,
    pub solver_version: String,
    pub integrator: String,
    pub steps: usize,
    pub end_days: f64,
    pub status: RunStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RunStatus {
    Complete,
    /// Stored prefix ends at the last valid state before `index`.
    Diverged {
        index: usize,
        time_days: f64,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeseriesRecord {
    pub time_d: f64,
    #[serde(flatten)]
    pub values: MonitoredVariables,
}
