//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Value`] - The value held by a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangle of cells (e.g., "A1:B10")
//! - [`Cell`] - A graph node: value, optional formula, parent and child links

mod address;
mod node;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use node::Cell;
pub use value::{ErrorKind, Value};
