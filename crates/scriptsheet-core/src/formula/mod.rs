//! Formula representation and evaluation
//!
//! A [`Formula`] is built from already-resolved cell addresses (the text
//! parser lives in `scriptsheet-formula`) and never changes once built.
//! Evaluation reads cell values through [`ValueLookup`] and always produces a
//! [`crate::Value`]; failures come back as [`crate::Value::Error`].

mod ast;
mod eval;

pub use ast::{ArithOp, Comparator, Formula, RangeOp};
pub use eval::ValueLookup;
