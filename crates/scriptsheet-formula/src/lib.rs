//! # scriptsheet-formula
//!
//! Formula text parser for scriptsheet.
//!
//! Turns text such as `=SUM(A1:B2) * 2` into a [`scriptsheet_core::Formula`],
//! resolving every cell reference against a [`scriptsheet_core::Grid`] so
//! that references outside the grid are rejected before an edit happens.
//!
//! ## Example
//!
//! ```rust
//! use scriptsheet_core::{CellAddress, Grid, Value};
//! use scriptsheet_formula::parse_formula;
//!
//! let mut grid = Grid::new(4, 4).unwrap();
//! let a1 = CellAddress::parse("A1").unwrap();
//! let b1 = CellAddress::parse("B1").unwrap();
//! grid.set_literal(a1, "20").unwrap();
//!
//! let formula = parse_formula("=A1 / 4 + 1", &grid).unwrap();
//! grid.set_formula(b1, formula).unwrap();
//! assert_eq!(grid.value(b1).unwrap(), &Value::Number(6.0));
//! ```

pub mod error;
pub mod parser;

pub use error::{FormulaError, FormulaResult};
pub use parser::parse_formula;
