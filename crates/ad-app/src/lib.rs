//! Shared application service layer for digestflow.
//!
//! Centralizes scenario loading, run execution with the on-disk cache,
//! parallel batches and the substrate report for the CLI.

pub mod batch;
pub mod error;
pub mod progress;
pub mod report;
pub mod run_service;
pub mod scenario_service;

pub use batch::{BatchJob, BatchResult, run_batch};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use report::{LabelTable, SubstrateReport};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, SimulationOutcome, ensure_run,
    ensure_run_with_progress, export_run_csv, final_state_path, list_runs, load_run, simulate,
};
pub use scenario_service::{
    LoadedSubstrates, ScenarioSummary, check_slots, load_initial_state, load_scenario,
    load_substrates, validate_scenario_files,
};
