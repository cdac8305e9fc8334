//! Substrate database errors.

use crate::symbols::Symbol;
use thiserror::Error;

pub type SubstrateResult<T> = Result<T, SubstrateError>;

#[derive(Error, Debug)]
pub enum SubstrateError {
    /// Malformed document. `location` is a substrate id, a list position, or
    /// a line/column in the source text.
    #[error("Parse error at {location}: {what}")]
    Parse { location: String, what: String },

    #[error("Substrate not found: {id}")]
    NotFound { id: String },

    #[error("Substrate '{id}' has no {symbol} parameter")]
    MissingParameter { id: String, symbol: Symbol },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SubstrateError {
    pub(crate) fn parse(location: impl Into<String>, what: impl Into<String>) -> Self {
        SubstrateError::Parse {
            location: location.into(),
            what: what.into(),
        }
    }
}

impl From<serde_yaml::Error> for SubstrateError {
    fn from(e: serde_yaml::Error) -> Self {
        let location = match e.location() {
            Some(loc) => format!("line {}, column {}", loc.line(), loc.column()),
            None => "document".to_string(),
        };
        SubstrateError::parse(location, e.to_string())
    }
}

impl From<serde_json::Error> for SubstrateError {
    fn from(e: serde_json::Error) -> Self {
        SubstrateError::parse(
            format!("line {}, column {}", e.line(), e.column()),
            e.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_errors_become_parse_errors() {
        let err: SubstrateError = serde_yaml::from_str::<Vec<u32>>("- 1\n- [")
            .unwrap_err()
            .into();
        match err {
            SubstrateError::Parse { location, .. } => assert!(!location.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_parameter_names_symbol() {
        let err = SubstrateError::MissingParameter {
            id: "maize".into(),
            symbol: Symbol::Ts,
        };
        let msg = err.to_string();
        assert!(msg.contains("maize"));
        assert!(msg.contains("TS"));
    }
}
