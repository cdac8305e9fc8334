//! Independent runs in parallel.
//!
//! Each job builds its own simulator, so jobs share nothing but the
//! read-only substrate database.

use ad_core::ReactorState;
use ad_scenario::Scenario;
use ad_substrates::SubstrateDatabase;
use rayon::prelude::*;
use tracing::info;

use crate::error::AppResult;
use crate::run_service::{self, SimulationOutcome};

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub label: String,
    pub scenario: Scenario,
    pub initial: ReactorState,
}

#[derive(Debug)]
pub struct BatchResult {
    pub label: String,
    pub outcome: AppResult<SimulationOutcome>,
}

/// Results come back in job order.
pub fn run_batch(db: &SubstrateDatabase, jobs: &[BatchJob]) -> Vec<BatchResult> {
    info!(jobs = jobs.len(), "running batch");
    jobs.par_iter()
        .map(|job| BatchResult {
            label: job.label.clone(),
            outcome: run_service::simulate(&job.scenario, db, &job.initial, None),
        })
        .collect()
}
