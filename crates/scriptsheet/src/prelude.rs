//! Prelude module - common imports for scriptsheet users
//!
//! ```rust
//! use scriptsheet::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellRange,
    ErrorKind,
    Value,

    // Formula types
    ArithOp,
    Comparator,
    Formula,
    RangeOp,

    // Grid types
    Grid,
    GridOptions,
    PropagationStats,
    Snapshot,

    // Session types
    Command,
    Outcome,
    Session,

    // Error types
    CommandError,
    CommandResult,
    Error,
    FormulaError,
    Result,

    parse_formula,
};
