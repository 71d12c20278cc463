//! Cell graph node

use ahash::AHashSet;

use super::{CellAddress, Value};
use crate::formula::Formula;

/// A single grid position: its value, its formula and its place in the
/// dependency graph
///
/// Links are stored as addresses, never as references to other cells; the
/// [`crate::Grid`] owns every cell and is the only thing that mutates them.
/// Between edits, `p` is among this cell's parents exactly when this cell is
/// among `p`'s children.
#[derive(Debug, Clone)]
pub struct Cell {
    address: CellAddress,
    value: Value,
    formula: Option<Formula>,
    /// Cells this cell's formula reads
    parents: AHashSet<CellAddress>,
    /// Cells whose formula reads this cell
    children: AHashSet<CellAddress>,
}

impl Cell {
    pub(crate) fn new(address: CellAddress) -> Self {
        Self {
            address,
            value: Value::empty(),
            formula: None,
            parents: AHashSet::new(),
            children: AHashSet::new(),
        }
    }

    /// Get the cell's address
    pub fn address(&self) -> CellAddress {
        self.address
    }

    /// Get the display label (e.g., "B3")
    pub fn label(&self) -> String {
        self.address.to_a1_string()
    }

    /// Get the current value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get the formula, if the cell is computed
    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    /// Check if the cell is computed rather than literal
    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// Cells this cell reads, in row-major order
    pub fn parents(&self) -> Vec<CellAddress> {
        sorted(&self.parents)
    }

    /// Cells reading this cell, in row-major order
    pub fn children(&self) -> Vec<CellAddress> {
        sorted(&self.children)
    }

    /// Check whether this cell reads `addr`
    pub fn has_parent(&self, addr: &CellAddress) -> bool {
        self.parents.contains(addr)
    }

    /// Check whether `addr` reads this cell
    pub fn has_child(&self, addr: &CellAddress) -> bool {
        self.children.contains(addr)
    }

    /// Check whether the cell takes part in the dependency graph at all
    pub fn is_linked(&self) -> bool {
        !self.parents.is_empty() || !self.children.is_empty()
    }

    pub(crate) fn parent_set(&self) -> &AHashSet<CellAddress> {
        &self.parents
    }

    /// Store a new value, returning whether it differs from the old one
    pub(crate) fn set_value(&mut self, value: Value) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    pub(crate) fn set_formula(&mut self, formula: Option<Formula>) {
        self.formula = formula;
    }

    pub(crate) fn insert_parent(&mut self, addr: CellAddress) {
        self.parents.insert(addr);
    }

    pub(crate) fn remove_parent(&mut self, addr: &CellAddress) {
        self.parents.remove(addr);
    }

    pub(crate) fn insert_child(&mut self, addr: CellAddress) {
        self.children.insert(addr);
    }

    pub(crate) fn remove_child(&mut self, addr: &CellAddress) {
        self.children.remove(addr);
    }
}

fn sorted(set: &AHashSet<CellAddress>) -> Vec<CellAddress> {
    let mut addrs: Vec<CellAddress> = set.iter().copied().collect();
    addrs.sort_unstable();
    addrs
}
