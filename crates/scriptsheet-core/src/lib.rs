//! # scriptsheet-core
//!
//! Core engine for the scriptsheet spreadsheet.
//!
//! This crate provides:
//! - [`Value`] and [`ErrorKind`] - What a cell holds (number, text or error marker)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Formula`] - Closed set of evaluable expressions
//! - [`Cell`] and [`Grid`] - The dependency graph and its owner
//! - [`find_cycle`] - Path-sensitive circular reference detection
//!
//! Every edit goes through [`Grid`], which keeps parent/child links symmetric
//! and recomputes dependents until values settle.
//!
//! ## Example
//!
//! ```rust
//! use scriptsheet_core::{CellAddress, Formula, Grid, Value};
//!
//! let mut grid = Grid::new(4, 4).unwrap();
//! let a1 = CellAddress::parse("A1").unwrap();
//! let b1 = CellAddress::parse("B1").unwrap();
//! let a2 = CellAddress::parse("A2").unwrap();
//!
//! grid.set_literal(a1, "3").unwrap();
//! grid.set_literal(b1, "2").unwrap();
//! grid.set_formula(a2, Formula::sum(vec![a1, b1])).unwrap();
//! assert_eq!(grid.value(a2).unwrap(), &Value::Number(5.0));
//!
//! grid.set_literal(a1, "4").unwrap();
//! assert_eq!(grid.value(a2).unwrap(), &Value::Number(6.0));
//! ```

pub mod cell;
pub mod dependency;
pub mod error;
pub mod formula;
pub mod grid;
pub mod snapshot;

pub use cell::{Cell, CellAddress, CellRange, ErrorKind, Value};
pub use dependency::find_cycle;
pub use error::{Error, Result};
pub use formula::{ArithOp, Comparator, Formula, RangeOp, ValueLookup};
pub use grid::{Grid, GridOptions, PropagationStats};
pub use snapshot::Snapshot;

/// Maximum number of rows in a grid
pub const MAX_ROWS: u32 = 10_000;

/// Maximum number of columns in a grid (A..ZZ)
pub const MAX_COLS: u16 = 702;
