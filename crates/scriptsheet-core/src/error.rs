//! Error types for scriptsheet-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when addressing or editing a grid
///
/// These reject an operation outright. Evaluation problems never show up
/// here; they become [`crate::Value::Error`] in the affected cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range (corners out of order)
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u16, u16),

    /// Grid dimensions are zero or exceed the supported maximum
    #[error("Invalid grid dimensions: {rows} rows x {cols} columns")]
    InvalidDimensions { rows: u32, cols: u16 },
}
