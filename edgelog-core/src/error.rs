//! Validation errors raised by the normalizer.
//!
//! These are the only caller-visible failures in the analytics pipeline.
//! Degenerate statistics and combination blow-up are resolved locally by the
//! analytics components and never surface as errors.

use thiserror::Error;

/// A raw record is missing a mandatory identity field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field 'symbol'")]
    MissingSymbol,
    #[error("missing required field 'direction'")]
    MissingDirection,
    #[error("invalid direction '{0}': expected long or short")]
    InvalidDirection(String),
    #[error("missing timestamp: neither 'date' nor 'created_at' is usable")]
    MissingTimestamp,
}

impl ValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingSymbol => "symbol",
            Self::MissingDirection | Self::InvalidDirection(_) => "direction",
            Self::MissingTimestamp => "date",
        }
    }
}

/// A validation failure tied to its position in the input batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {index}: {source}")]
pub struct RecordError {
    pub index: usize,
    #[source]
    pub source: ValidationError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names() {
        assert_eq!(ValidationError::MissingSymbol.field(), "symbol");
        assert_eq!(ValidationError::InvalidDirection("up".into()).field(), "direction");
        assert_eq!(ValidationError::MissingTimestamp.field(), "date");
    }

    #[test]
    fn record_error_display_includes_index() {
        let err = RecordError {
            index: 3,
            source: ValidationError::MissingDirection,
        };
        assert_eq!(err.to_string(), "record 3: missing required field 'direction'");
    }
}
