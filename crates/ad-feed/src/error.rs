use ad_core::AdError;
use ad_substrates::SubstrateError;
use thiserror::Error;

pub type FeedResult<T> = Result<T, FeedError>;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed plan has {actual} rates for {expected} slots")]
    SlotCount { expected: usize, actual: usize },

    #[error("Invalid flow rate {value} m3/d in slot {slot}")]
    InvalidRate { slot: usize, value: f64 },

    #[error("Slot {slot} ({substrate_id}) is not controllable but has flow {value} m3/d")]
    DisabledSlot {
        slot: usize,
        substrate_id: String,
        value: f64,
    },

    #[error("Feeding interval must be positive and finite, got {hours} h")]
    InvalidInterval { hours: f64 },

    #[error("Feed schedule has no plans")]
    EmptySchedule,

    #[error("Substrate error: {0}")]
    Substrate(#[from] SubstrateError),

    #[error("Core error: {0}")]
    Core(#[from] AdError),
}
