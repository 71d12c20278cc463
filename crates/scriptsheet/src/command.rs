//! Command line grammar
//!
//! ```text
//! A1 = 42            literal number
//! A2 = hello         literal text
//! A3 = "42"          quoted literal, always text
//! B1 = =SUM(A1:A3)   formula
//! /help /table /dependencies /deps /clear /quit /exit
//! ```

use lazy_regex::regex_captures;
use scriptsheet_core::CellAddress;

use crate::error::{CommandError, CommandResult};

/// What the right-hand side of an assignment holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Unquoted literal; numbers are recognized
    Literal(String),
    /// Quoted literal, stored as text verbatim
    Text(String),
    /// Formula text, without the leading `=`
    Formula(String),
}

/// One parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `CELL = input`
    Assign { target: CellAddress, input: Input },
    /// `/help`
    Help,
    /// `/table`
    Table,
    /// `/dependencies` or `/deps`
    Dependencies,
    /// `/clear`
    Clear,
    /// `/quit` or `/exit`
    Quit,
    /// Blank line or `#` comment
    Nothing,
}

impl Command {
    /// Parse one line of input
    ///
    /// The target address is only checked for syntax here; whether it lies
    /// inside the grid is up to the session.
    pub fn parse(line: &str) -> CommandResult<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Command::Nothing);
        }

        if let Some(name) = line.strip_prefix('/') {
            return match name.trim().to_lowercase().as_str() {
                "help" | "h" | "?" => Ok(Command::Help),
                "table" => Ok(Command::Table),
                "dependencies" | "deps" => Ok(Command::Dependencies),
                "clear" => Ok(Command::Clear),
                "quit" | "exit" | "q" => Ok(Command::Quit),
                _ => Err(CommandError::UnknownCommand(name.trim().to_string())),
            };
        }

        let Some((_, target, rhs)) = regex_captures!(r"^([A-Za-z]+[0-9]+)\s*=\s*(.*)$", line)
        else {
            return Err(CommandError::Malformed(line.to_string()));
        };

        let target = CellAddress::parse(target)?;
        Ok(Command::Assign {
            target,
            input: Input::parse(rhs),
        })
    }
}

impl Input {
    /// Classify the right-hand side of an assignment
    pub fn parse(rhs: &str) -> Self {
        let rhs = rhs.trim();
        if let Some(formula) = rhs.strip_prefix('=') {
            return Input::Formula(formula.trim().to_string());
        }

        match rhs
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Some(text) => Input::Text(text.to_string()),
            None => Input::Literal(rhs.to_string()),
        }
    }
}
