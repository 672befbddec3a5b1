//! Structured converter errors
//!
//! Errors never escape the engine boundary as panics. Internal fallible paths
//! return `ConverterError`, the engine logs it and falls back to a safe state.

use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const MALFORMED_STATE: &str = "MALFORMED_STATE";
    pub const INVALID_NUMBER: &str = "INVALID_NUMBER";
    pub const INVALID_FLAG: &str = "INVALID_FLAG";
    pub const UNKNOWN_CATEGORY: &str = "UNKNOWN_CATEGORY";
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConverterError {
    #[error("expected {expected} sections in serialized {what}, found {found}")]
    SectionCount { what: &'static str, expected: usize, found: usize },

    #[error("expected {expected} fields in serialized {what}, found {found}")]
    FieldCount { what: &'static str, expected: usize, found: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid flag '{0}', expected 0 or 1")]
    InvalidFlag(String),

    #[error("unknown category {0}")]
    UnknownCategory(i32),

    #[error("unknown unit {0}")]
    UnknownUnit(i32),
}

impl ConverterError {
    /// Machine-readable code, see [`codes`]
    pub fn code(&self) -> &'static str {
        match self {
            ConverterError::SectionCount { .. } | ConverterError::FieldCount { .. } => codes::MALFORMED_STATE,
            ConverterError::InvalidNumber(_) => codes::INVALID_NUMBER,
            ConverterError::InvalidFlag(_) => codes::INVALID_FLAG,
            ConverterError::UnknownCategory(_) => codes::UNKNOWN_CATEGORY,
            ConverterError::UnknownUnit(_) => codes::UNKNOWN_UNIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ConverterError::SectionCount { what: "state", expected: 4, found: 1 };
        assert_eq!(err.code(), codes::MALFORMED_STATE);
        assert_eq!(ConverterError::UnknownUnit(3).code(), codes::UNKNOWN_UNIT);
    }

    #[test]
    fn test_error_display() {
        let err = ConverterError::FieldCount { what: "unit", expected: 6, found: 2 };
        assert_eq!(err.to_string(), "expected 6 fields in serialized unit, found 2");
        assert_eq!(ConverterError::InvalidFlag("x".into()).to_string(), "invalid flag 'x', expected 0 or 1");
    }
}
