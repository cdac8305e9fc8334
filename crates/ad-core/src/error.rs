use thiserror::Error;

pub type AdResult<T> = Result<T, AdError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Shape mismatch for {what}: expected {expected} entries, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid time grid at index {index}: {what}")]
    TimeGrid { what: &'static str, index: usize },
}
