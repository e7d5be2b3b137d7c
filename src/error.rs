use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while building or evaluating a model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The model cannot be built from the given problem.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The operation exists in the interface but this model does not provide it.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("dimension mismatch in {context}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("index {index} out of range in {context} (length {len})")]
    IndexOutOfRange {
        context: &'static str,
        index: usize,
        len: usize,
    },
    #[error("invalid bounds in {context} at index {index}: lower {lower} > upper {upper}")]
    InvalidBounds {
        context: &'static str,
        index: usize,
        lower: f64,
        upper: f64,
    },
}

/// Fails with `DimensionMismatch` unless `actual == expected`.
#[inline]
pub fn ensure_len(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            context,
            expected,
            actual,
        })
    }
}
