//! Error types for simulation runs.

use ad_core::{AdError, ReactorState};
use ad_feed::FeedError;
use thiserror::Error;

use crate::trace::SimulationTrace;

/// Where and why a run left the admissible domain.
#[derive(Debug, Clone)]
pub struct Divergence {
    /// Grid index whose state could not be produced (0 for a bad initial state).
    pub index: usize,
    pub time_days: f64,
    pub reason: String,
    /// Last state that passed the domain check; `None` at index 0.
    pub last_valid: Option<ReactorState>,
    /// Recorded prefix, when the run was collecting in memory.
    pub partial: Option<SimulationTrace>,
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: &'static str },

    #[error("Simulation diverged at step {} (t = {} d): {}", .0.index, .0.time_days, .0.reason)]
    Divergence(Box<Divergence>),

    #[error("Trace sink error: {message}")]
    Sink { message: String },

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Core error: {0}")]
    Core(#[from] AdError),
}

impl SimError {
    pub fn divergence(&self) -> Option<&Divergence> {
        match self {
            SimError::Divergence(d) => Some(d),
            _ => None,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
