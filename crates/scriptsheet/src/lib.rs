//! # scriptsheet
//!
//! A small reactive spreadsheet.
//!
//! Cells hold numbers, text or formulas over other cells. Changing a cell
//! recomputes everything that depends on it, and circular references show
//! up as `#CYCLE!` instead of hanging.
//!
//! ## Features
//!
//! - Arithmetic with `+ - * /`, parentheses and unary minus
//! - `SUM`, `PRODUCT`, `DIFF`, `AVERAGE` and `CONCAT` over cells and ranges
//! - `IF` with numeric or text comparisons
//! - A line-oriented command language with text rendering ([`Session`])
//!
//! ## Example
//!
//! ```rust
//! use scriptsheet::prelude::*;
//!
//! let mut session = Session::new(GridOptions::default()).unwrap();
//! session.execute("D2 = 1").unwrap();
//! session.execute("D3 = 1").unwrap();
//! session.execute("D1 = =CONCAT(D2, D3)").unwrap();
//!
//! let d1 = CellAddress::parse("D1").unwrap();
//! assert_eq!(session.grid().value(d1).unwrap(), &Value::text("11"));
//!
//! // Closing a loop marks the cells involved
//! session.execute("D2 = =CONCAT(D1, D3)").unwrap();
//! let d2 = CellAddress::parse("D2").unwrap();
//! assert_eq!(session.grid().value(d2).unwrap(), &Value::Error(ErrorKind::Cycle));
//! ```

pub mod command;
pub mod error;
pub mod prelude;
pub mod render;
pub mod session;

pub use command::{Command, Input};
pub use error::{CommandError, CommandResult};
pub use render::{render_dependencies, render_table};
pub use session::{Outcome, Session, HELP};

// Re-export core types
pub use scriptsheet_core::{
    find_cycle, ArithOp, Cell, CellAddress, CellRange, Comparator, Error, ErrorKind, Formula,
    Grid, GridOptions, PropagationStats, RangeOp, Result, Snapshot, Value, ValueLookup, MAX_COLS,
    MAX_ROWS,
};

// Re-export formula types
pub use scriptsheet_formula::{parse_formula, FormulaError, FormulaResult};
