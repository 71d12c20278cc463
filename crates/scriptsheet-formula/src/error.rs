//! Formula error types

use thiserror::Error;

/// Result type for formula parsing
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that reject formula text before it reaches the grid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Reference that does not name a cell in the grid
    #[error("Invalid reference: {0}")]
    Reference(#[from] scriptsheet_core::Error),
}
