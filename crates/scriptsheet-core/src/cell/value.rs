//! Cell value types

use std::fmt;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents the value held by a cell or produced by a formula
///
/// Equality is structural: numbers compare numerically, text and errors by
/// content. Recalculation relies on it to decide whether a change has to be
/// pushed to dependent cells.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Numeric value
    Number(f64),

    /// Text value (the empty string is an empty cell)
    Text(String),

    /// Error marker (#CYCLE!, #INVALID!, #DIV/0!)
    Error(ErrorKind),
}

impl Value {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// The value of a cell nobody has written to
    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    /// Interpret user input as a literal
    ///
    /// Text that is a finite number once surrounding whitespace is removed
    /// becomes [`Value::Number`]; anything else is kept verbatim as
    /// [`Value::Text`]. Blank input is the empty cell.
    ///
    /// ```
    /// use scriptsheet_core::Value;
    ///
    /// assert_eq!(Value::from_literal(" 42 "), Value::Number(42.0));
    /// assert_eq!(Value::from_literal("x"), Value::text("x"));
    /// ```
    pub fn from_literal(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Value::empty();
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(input.to_string()),
        }
    }

    /// Check if the value is the empty cell
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    /// Get the number, if this is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Text(s) => write!(f, "{}", s),
            Value::Error(e) => write!(f, "{}", e.as_str()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<ErrorKind> for Value {
    fn from(e: ErrorKind) -> Self {
        Value::Error(e)
    }
}

/// Why a formula could not produce a regular value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ErrorKind {
    /// The cell depends on itself, directly or through other cells
    #[error("circular reference")]
    Cycle,

    /// An operator or reduction got a value it cannot work with
    #[error("invalid operand")]
    InvalidOperand,

    /// Division (or an average) by zero
    #[error("division by zero")]
    DivideByZero,
}

impl ErrorKind {
    /// Get the marker shown in a cell holding this error
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Cycle => "#CYCLE!",
            ErrorKind::InvalidOperand => "#INVALID!",
            ErrorKind::DivideByZero => "#DIV/0!",
        }
    }
}
