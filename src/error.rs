//! Error type shared by the engine operations.
//!
//! Low-level numeric primitives in [`crate::special`] never return errors;
//! they follow IEEE-754 and hand back NaN or infinity. Shape and parameter
//! checks happen at the engine boundary and surface as [`StatsError`].

use thiserror::Error;

/// Errors raised by engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("input is empty")]
    EmptyInput,

    #[error("insufficient data: need at least {needed} values, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("input contains NaN or infinite values")]
    NonFinite,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("ragged matrix: row {row} has {got} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("dimension mismatch: {left_rows}x{left_cols} cannot be combined with {right_rows}x{right_cols}")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("matrix is singular or nearly singular")]
    SingularMatrix,

    #[error("zero variance: statistic is undefined")]
    ZeroVariance,

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for engine operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Fails with [`StatsError::NonFinite`] unless every value is finite.
pub(crate) fn ensure_finite(data: &[f64]) -> StatsResult<()> {
    if data.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(StatsError::NonFinite)
    }
}

/// Fails with [`StatsError::InsufficientData`] when `data.len() < needed`.
pub(crate) fn ensure_len(data: &[f64], needed: usize) -> StatsResult<()> {
    if data.len() < needed {
        Err(StatsError::InsufficientData {
            needed,
            got: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates a probability-like parameter in the open interval (0, 1).
pub(crate) fn ensure_open_unit(name: &str, value: f64) -> StatsResult<()> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(StatsError::InvalidParameter(format!(
            "{name} must be in (0, 1), got {value}"
        )))
    }
}
