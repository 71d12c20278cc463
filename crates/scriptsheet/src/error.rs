//! Command error types

use thiserror::Error;

/// Result type for session commands
pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Errors that reject a command line
///
/// A rejected command leaves the grid exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// `/name` that is not a known command
    #[error("Unknown command '/{0}' (try /help)")]
    UnknownCommand(String),

    /// Line that is neither a command nor a `CELL = input` assignment
    #[error("Cannot understand '{0}' (expected CELL = value or a /command)")]
    Malformed(String),

    /// Formula text that failed to parse
    #[error(transparent)]
    Formula(#[from] scriptsheet_formula::FormulaError),

    /// Address or edit rejected by the grid
    #[error(transparent)]
    Grid(#[from] scriptsheet_core::Error),
}
