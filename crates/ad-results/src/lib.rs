//! ad-results: monitored variables, checkpoints, tabular export and the run
//! cache.

pub mod checkpoint;
pub mod export;
pub mod extract;
pub mod hash;
pub mod store;
pub mod types;

pub use checkpoint::{load_initial_state, parse_state, save_final_state, write_state};
pub use export::{CsvTableSink, write_records, write_table};
pub use extract::{Extractor, MonitoredVariables};
pub use hash::compute_run_id;
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("State has {actual} values, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Parse error in {source_name} at line {line}, column {column}: {what}")]
    Parse {
        source_name: String,
        line: usize,
        column: usize,
        what: String,
    },

    #[error("Empty trace: nothing to checkpoint")]
    EmptyTrace,

    #[error("Core error: {0}")]
    Core(#[from] ad_core::AdError),
}
