//! Error types for the anofox-deterministic library.

use thiserror::Error;

/// Result type alias for deterministic-term operations.
pub type Result<T> = std::result::Result<T, DeterministicError>;

/// Errors that can occur while building or evaluating deterministic terms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeterministicError {
    /// The index has no observations.
    #[error("empty index")]
    EmptyIndex,

    /// A generated frame does not have the expected number of rows.
    #[error("shape mismatch in {context}: expected {expected} rows, got {got}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        got: usize,
    },

    /// A range bound is malformed or cannot be located on the index.
    #[error("range error: {0}")]
    RangeError(String),

    /// Incompatible combination of options.
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The index is not strictly increasing with a fixed step.
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// Two generated columns share a name.
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },
}

impl DeterministicError {
    pub(crate) fn shape(context: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected,
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = DeterministicError::EmptyIndex;
        assert_eq!(err.to_string(), "empty index");

        let err = DeterministicError::shape("Seasonality(period=7)", 10, 9);
        assert_eq!(
            err.to_string(),
            "shape mismatch in Seasonality(period=7): expected 10 rows, got 9"
        );

        let err = DeterministicError::RangeError("stop precedes start".to_string());
        assert_eq!(err.to_string(), "range error: stop precedes start");

        let err = DeterministicError::ConfigurationError("trend must be 'n'".to_string());
        assert_eq!(err.to_string(), "configuration error: trend must be 'n'");

        let err = DeterministicError::InsufficientData { needed: 4, got: 3 };
        assert_eq!(err.to_string(), "insufficient data: need at least 4, got 3");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = DeterministicError::DuplicateColumn("const".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
