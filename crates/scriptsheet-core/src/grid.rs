//! Grid: cell storage, edits and change propagation

use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace, warn};

use crate::cell::{Cell, CellAddress, CellRange, ErrorKind, Value};
use crate::dependency::find_cycle;
use crate::error::{Error, Result};
use crate::formula::{Formula, ValueLookup};
use crate::snapshot::Snapshot;
use crate::{MAX_COLS, MAX_ROWS};

/// Options for creating a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    /// Number of rows (default: 4)
    pub rows: u32,
    /// Number of columns (default: 4)
    pub cols: u16,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self { rows: 4, cols: 4 }
    }
}

/// What an edit touched while bringing dependent cells up to date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationStats {
    /// Dependent cells re-evaluated, in the order they were visited
    pub recomputed: Vec<CellAddress>,
    /// Cells whose value changed, the edited cell included
    pub changed: Vec<CellAddress>,
    /// Cells that evaluated to a circular reference error
    pub cycles: Vec<CellAddress>,
}

impl PropagationStats {
    /// Number of dependent cells re-evaluated
    pub fn cells_recomputed(&self) -> usize {
        self.recomputed.len()
    }

    /// Whether `addr` ended the edit with a different value
    pub fn was_changed(&self, addr: CellAddress) -> bool {
        self.changed.contains(&addr)
    }
}

/// A fixed-size grid of cells
///
/// The grid owns every [`Cell`] in a flat row-major arena. Cells reference
/// each other by address only, so the dependency graph never forms
/// ownership cycles. All edits go through [`Grid::set_literal`],
/// [`Grid::set_value`] and [`Grid::set_formula`], which keep parent and
/// child links symmetric and run propagation to completion before
/// returning.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: u32,
    cols: u16,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of `rows` x `cols` empty cells
    pub fn new(rows: u32, cols: u16) -> Result<Self> {
        Self::with_options(GridOptions { rows, cols })
    }

    /// Create a grid from options
    pub fn with_options(options: GridOptions) -> Result<Self> {
        let GridOptions { rows, cols } = options;
        if rows == 0 || cols == 0 || rows > MAX_ROWS || cols > MAX_COLS {
            return Err(Error::InvalidDimensions { rows, cols });
        }

        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Cell::new(CellAddress::new(row, col))))
            .collect();

        Ok(Self { rows, cols, cells })
    }

    /// Number of rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Options this grid was created with
    pub fn options(&self) -> GridOptions {
        GridOptions {
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Check if an address lies inside the grid
    pub fn contains(&self, addr: CellAddress) -> bool {
        addr.row < self.rows && addr.col < self.cols
    }

    fn index(&self, addr: CellAddress) -> Result<usize> {
        if addr.row >= self.rows {
            return Err(Error::RowOutOfBounds(addr.row, self.rows - 1));
        }
        if addr.col >= self.cols {
            return Err(Error::ColumnOutOfBounds(addr.col, self.cols - 1));
        }
        Ok(addr.row as usize * self.cols as usize + addr.col as usize)
    }

    // === Cell access ===

    /// Get a cell by row and column indices (0-based)
    pub fn get_cell(&self, row: u32, col: u16) -> Result<&Cell> {
        self.cell(CellAddress::new(row, col))
    }

    /// Get a cell by address
    pub fn cell(&self, addr: CellAddress) -> Result<&Cell> {
        let idx = self.index(addr)?;
        Ok(&self.cells[idx])
    }

    /// Get a cell's current value
    pub fn value(&self, addr: CellAddress) -> Result<&Value> {
        self.cell(addr).map(Cell::value)
    }

    /// Addresses of the rectangle from `top_left` to `bottom_right`,
    /// row by row, both corners included
    pub fn get_range(
        &self,
        top_left: CellAddress,
        bottom_right: CellAddress,
    ) -> Result<Vec<CellAddress>> {
        self.index(top_left)?;
        self.index(bottom_right)?;

        let range = CellRange::new(top_left, bottom_right);
        if !range.is_ordered() {
            return Err(Error::InvalidRange(format!(
                "{} is not the top-left corner of {}",
                top_left, bottom_right
            )));
        }

        Ok(range.cells().collect())
    }

    /// Iterate over all cells, row by row
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Iterate over cells that hold a formula or are read by one
    pub fn linked_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells
            .iter()
            .filter(|cell| cell.has_formula() || cell.is_linked())
    }

    /// Copy every value for rendering
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.rows,
            self.cols,
            self.cells.iter().map(|cell| cell.value().clone()).collect(),
        )
    }

    // === Edits ===

    /// Store literal input in a cell
    ///
    /// Input that reads as a number is stored as one, anything else as text
    /// (see [`Value::from_literal`]). Any formula is dropped along with its
    /// parent links.
    pub fn set_literal(&mut self, addr: CellAddress, input: &str) -> Result<PropagationStats> {
        self.set_value(addr, Value::from_literal(input))
    }

    /// Store a value verbatim in a cell, dropping any formula
    ///
    /// A non-finite number is stored as [`ErrorKind::InvalidOperand`], the
    /// same as a formula overflowing.
    pub fn set_value<V: Into<Value>>(&mut self, addr: CellAddress, value: V) -> Result<PropagationStats> {
        let idx = self.index(addr)?;
        let value = match value.into() {
            Value::Number(n) if !n.is_finite() => Value::Error(ErrorKind::InvalidOperand),
            value => value,
        };
        debug!(cell = %addr, value = %value, "setting literal");

        self.relink(addr, &AHashSet::new());
        self.cells[idx].set_formula(None);

        let mut stats = PropagationStats::default();
        if self.cells[idx].set_value(value) {
            stats.changed.push(addr);
            self.propagate(addr, &mut stats);
        }
        Ok(stats)
    }

    /// Assign a formula to a cell
    ///
    /// Every address the formula references must be inside the grid;
    /// otherwise the edit is rejected and nothing changes. An edit that
    /// closes a cycle is accepted: the links are committed and the cell
    /// holds [`ErrorKind::Cycle`] until the cycle is broken.
    pub fn set_formula(&mut self, addr: CellAddress, formula: Formula) -> Result<PropagationStats> {
        let idx = self.index(addr)?;
        let parents = formula.depends_on();
        for parent in &parents {
            self.index(*parent)?;
        }
        debug!(cell = %addr, formula = %formula, "setting formula");

        self.relink(addr, &parents);
        self.cells[idx].set_formula(Some(formula));

        let mut stats = PropagationStats::default();
        let value = self.evaluate_cell(addr, &mut stats);
        if self.cells[idx].set_value(value) {
            stats.changed.push(addr);
            self.propagate(addr, &mut stats);
        }
        Ok(stats)
    }

    /// Replace `addr`'s parent set with `parents`
    ///
    /// Only links that actually change are touched, and each one is updated
    /// on both ends before moving to the next.
    fn relink(&mut self, addr: CellAddress, parents: &AHashSet<CellAddress>) {
        let Ok(idx) = self.index(addr) else {
            return;
        };
        let old = self.cells[idx].parent_set();
        let removed: Vec<CellAddress> = old.difference(parents).copied().collect();
        let added: Vec<CellAddress> = parents.difference(old).copied().collect();

        for parent in removed {
            if let Ok(pidx) = self.index(parent) {
                self.cells[pidx].remove_child(&addr);
            }
            self.cells[idx].remove_parent(&parent);
        }
        for parent in added {
            if let Ok(pidx) = self.index(parent) {
                self.cells[pidx].insert_child(addr);
            }
            self.cells[idx].insert_parent(parent);
        }
    }

    // === Recalculation ===

    /// Compute what a cell should hold from its formula and current parents
    fn evaluate_cell(&self, addr: CellAddress, stats: &mut PropagationStats) -> Value {
        let Ok(cell) = self.cell(addr) else {
            return Value::Error(ErrorKind::InvalidOperand);
        };
        let Some(formula) = cell.formula() else {
            return cell.value().clone();
        };

        if let Some(path) = find_cycle(self, addr) {
            let path: Vec<String> = path.iter().map(CellAddress::to_a1_string).collect();
            warn!(cell = %addr, path = %path.join(" -> "), "circular reference");
            stats.cycles.push(addr);
            return Value::Error(ErrorKind::Cycle);
        }

        formula.evaluate(self)
    }

    /// Re-evaluate one computed cell, returning whether its value changed
    pub(crate) fn recompute(&mut self, addr: CellAddress, stats: &mut PropagationStats) -> bool {
        let Ok(idx) = self.index(addr) else {
            return false;
        };
        if !self.cells[idx].has_formula() {
            return false;
        }

        trace!(cell = %addr, "recomputing");
        stats.recomputed.push(addr);
        let value = self.evaluate_cell(addr, stats);
        let changed = self.cells[idx].set_value(value);
        if changed {
            stats.changed.push(addr);
        }
        changed
    }

    /// Bring every transitive child of `origin` up to date
    ///
    /// Dependents are visited in topological order, so a cell is evaluated
    /// at most once, after all of its affected parents. Only cells with a
    /// parent that changed are re-evaluated; an unchanged value stops the
    /// wave there. Cells on or behind a cycle never become ready on their
    /// own and are released one at a time, smallest address first.
    fn propagate(&mut self, origin: CellAddress, stats: &mut PropagationStats) {
        let affected = self.downstream_of(origin);
        let mut waiting: AHashMap<CellAddress, usize> = affected
            .iter()
            .map(|&addr| {
                let count = self.cell(addr).map_or(0, |cell| {
                    cell.parent_set()
                        .iter()
                        .filter(|parent| affected.contains(*parent))
                        .count()
                });
                (addr, count)
            })
            .collect();

        let mut ready: Vec<CellAddress> = waiting
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(addr, _)| *addr)
            .collect();
        for addr in &ready {
            waiting.remove(addr);
        }
        ready.sort_unstable_by(|a, b| b.cmp(a));

        let mut dirty: AHashSet<CellAddress> = self.children_of(origin).into_iter().collect();
        let mut done: AHashSet<CellAddress> = AHashSet::new();

        loop {
            while let Some(addr) = ready.pop() {
                let children = self.children_of(addr);
                if dirty.remove(&addr) && self.recompute(addr, stats) {
                    for &child in &children {
                        // A released cycle member can be dirtied after it ran
                        if dirty.insert(child) && done.contains(&child) {
                            ready.push(child);
                        }
                    }
                }

                if done.insert(addr) {
                    for child in children {
                        if let Some(count) = waiting.get_mut(&child) {
                            *count -= 1;
                            if *count == 0 {
                                waiting.remove(&child);
                                ready.push(child);
                            }
                        }
                    }
                }
            }

            let Some(&next) = waiting.keys().min() else {
                break;
            };
            waiting.remove(&next);
            ready.push(next);
        }

        debug!(
            cell = %origin,
            recomputed = stats.recomputed.len(),
            changed = stats.changed.len(),
            "propagation finished"
        );
    }

    /// Every cell reachable from `origin` through child links, `origin` excluded
    fn downstream_of(&self, origin: CellAddress) -> AHashSet<CellAddress> {
        let mut seen = AHashSet::new();
        let mut pending = self.children_of(origin);

        while let Some(addr) = pending.pop() {
            if addr != origin && seen.insert(addr) {
                pending.extend(self.children_of(addr));
            }
        }

        seen
    }

    fn children_of(&self, addr: CellAddress) -> Vec<CellAddress> {
        self.cell(addr).map(Cell::children).unwrap_or_default()
    }
}

impl ValueLookup for Grid {
    fn lookup(&self, addr: CellAddress) -> Option<&Value> {
        self.cell(addr).ok().map(Cell::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{ArithOp, Comparator};
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn value(grid: &Grid, s: &str) -> Value {
        grid.value(addr(s)).unwrap().clone()
    }

    fn assert_symmetric(grid: &Grid) {
        for cell in grid.cells() {
            for parent in cell.parents() {
                assert!(
                    grid.cell(parent).unwrap().has_child(&cell.address()),
                    "{} lists parent {} which does not list it as a child",
                    cell.address(),
                    parent
                );
            }
            for child in cell.children() {
                assert!(
                    grid.cell(child).unwrap().has_parent(&cell.address()),
                    "{} lists child {} which does not list it as a parent",
                    cell.address(),
                    child
                );
            }
        }
    }

    #[test]
    fn test_new_grid() {
        let grid = Grid::new(3, 2).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 2);
        assert_eq!(grid.cells().count(), 6);
        assert!(grid.cells().all(|c| c.value().is_empty()));
        assert_eq!(grid.options(), GridOptions { rows: 3, cols: 2 });
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(Grid::new(0, 4).is_err());
        assert!(Grid::new(4, 0).is_err());
        assert!(Grid::new(MAX_ROWS + 1, 1).is_err());
        assert!(Grid::with_options(GridOptions::default()).is_ok());
    }

    #[test]
    fn test_get_cell_bounds() {
        let grid = Grid::new(4, 4).unwrap();
        assert_eq!(grid.get_cell(3, 3).unwrap().label(), "D4");
        assert_eq!(grid.get_cell(4, 0).unwrap_err(), Error::RowOutOfBounds(4, 3));
        assert_eq!(grid.get_cell(0, 4).unwrap_err(), Error::ColumnOutOfBounds(4, 3));
    }

    #[test]
    fn test_get_range() {
        let grid = Grid::new(4, 4).unwrap();
        assert_eq!(
            grid.get_range(addr("A1"), addr("B2")).unwrap(),
            vec![addr("A1"), addr("B1"), addr("A2"), addr("B2")]
        );
        assert_eq!(grid.get_range(addr("C3"), addr("C3")).unwrap(), vec![addr("C3")]);
        assert!(matches!(
            grid.get_range(addr("B2"), addr("A1")),
            Err(Error::InvalidRange(_))
        ));
        assert!(grid.get_range(addr("A1"), addr("E1")).is_err());
    }

    #[test]
    fn test_sum_updates_when_parent_changes() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_literal(addr("A1"), "3").unwrap();
        grid.set_literal(addr("B1"), "2").unwrap();
        grid.set_formula(addr("A2"), Formula::sum(vec![addr("A1"), addr("B1")]))
            .unwrap();
        assert_eq!(value(&grid, "A2"), Value::Number(5.0));

        let stats = grid.set_literal(addr("A1"), "4").unwrap();
        assert_eq!(value(&grid, "A2"), Value::Number(6.0));
        assert_eq!(stats.recomputed, vec![addr("A2")]);
        assert_eq!(stats.changed, vec![addr("A1"), addr("A2")]);
    }

    #[test]
    fn test_unchanged_literal_does_not_propagate() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_literal(addr("A1"), "3").unwrap();
        grid.set_formula(addr("B1"), Formula::cell(addr("A1"))).unwrap();

        let stats = grid.set_literal(addr("A1"), " 3 ").unwrap();
        assert_eq!(stats, PropagationStats::default());
    }

    #[test]
    fn test_propagation_stops_at_unchanged_child() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_literal(addr("A1"), "5").unwrap();
        grid.set_formula(
            addr("B1"),
            Formula::conditional(
                Formula::cell(addr("A1")),
                Comparator::Greater,
                Formula::literal(0),
                Formula::literal(1),
                Formula::literal(0),
            ),
        )
        .unwrap();
        grid.set_formula(
            addr("C1"),
            Formula::arithmetic(Formula::cell(addr("B1")), ArithOp::Add, Formula::literal(1)),
        )
        .unwrap();
        assert_eq!(value(&grid, "C1"), Value::Number(2.0));

        let stats = grid.set_literal(addr("A1"), "6").unwrap();
        assert_eq!(stats.recomputed, vec![addr("B1")]);
        assert!(!stats.was_changed(addr("B1")));

        let stats = grid.set_literal(addr("A1"), "-1").unwrap();
        assert_eq!(stats.recomputed, vec![addr("B1"), addr("C1")]);
        assert_eq!(value(&grid, "C1"), Value::Number(1.0));
    }

    #[test]
    fn test_diamond_settles() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_literal(addr("A1"), "1").unwrap();
        grid.set_formula(
            addr("B1"),
            Formula::arithmetic(Formula::cell(addr("A1")), ArithOp::Multiply, Formula::literal(2)),
        )
        .unwrap();
        grid.set_formula(
            addr("B2"),
            Formula::arithmetic(Formula::cell(addr("A1")), ArithOp::Add, Formula::literal(10)),
        )
        .unwrap();
        grid.set_formula(addr("C1"), Formula::sum(vec![addr("B1"), addr("B2")]))
            .unwrap();
        assert_eq!(value(&grid, "C1"), Value::Number(13.0));

        let stats = grid.set_literal(addr("A1"), "2").unwrap();
        assert_eq!(value(&grid, "C1"), Value::Number(16.0));
        assert!(stats.cycles.is_empty());
    }

    #[test]
    fn test_formula_reassignment_updates_links() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_formula(addr("C1"), Formula::sum(vec![addr("A1"), addr("B1")]))
            .unwrap();
        grid.set_formula(addr("C1"), Formula::sum(vec![addr("B1"), addr("B2")]))
            .unwrap();

        let c1 = grid.cell(addr("C1")).unwrap();
        assert_eq!(c1.parents(), vec![addr("B1"), addr("B2")]);
        assert!(!grid.cell(addr("A1")).unwrap().has_child(&addr("C1")));
        assert!(grid.cell(addr("B1")).unwrap().has_child(&addr("C1")));
        assert!(grid.cell(addr("B2")).unwrap().has_child(&addr("C1")));
        assert_symmetric(&grid);

        grid.set_literal(addr("C1"), "x").unwrap();
        assert!(grid.cell(addr("C1")).unwrap().parents().is_empty());
        assert!(!grid.cell(addr("B1")).unwrap().has_child(&addr("C1")));
        assert_symmetric(&grid);
    }

    #[test]
    fn test_out_of_bounds_formula_is_rejected() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.set_formula(addr("A1"), Formula::cell(addr("B2"))).unwrap();

        let err = grid
            .set_formula(addr("A1"), Formula::cell(addr("C1")))
            .unwrap_err();
        assert_eq!(err, Error::ColumnOutOfBounds(2, 1));

        let a1 = grid.cell(addr("A1")).unwrap();
        assert_eq!(a1.formula(), Some(&Formula::cell(addr("B2"))));
        assert_eq!(a1.parents(), vec![addr("B2")]);
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let mut grid = Grid::new(4, 4).unwrap();
        let stats = grid
            .set_formula(
                addr("A1"),
                Formula::arithmetic(Formula::cell(addr("A1")), ArithOp::Add, Formula::literal(1)),
            )
            .unwrap();
        assert_eq!(value(&grid, "A1"), Value::Error(ErrorKind::Cycle));
        assert!(stats.cycles.contains(&addr("A1")));
        assert!(grid.cell(addr("A1")).unwrap().has_child(&addr("A1")));
    }

    #[test]
    fn test_breaking_cycle_recovers() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_formula(addr("A1"), Formula::cell(addr("B1"))).unwrap();
        grid.set_formula(addr("B1"), Formula::cell(addr("A1"))).unwrap();
        assert_eq!(value(&grid, "A1"), Value::Error(ErrorKind::Cycle));
        assert_eq!(value(&grid, "B1"), Value::Error(ErrorKind::Cycle));

        grid.set_literal(addr("B1"), "7").unwrap();
        assert_eq!(value(&grid, "B1"), Value::Number(7.0));
        assert_eq!(value(&grid, "A1"), Value::Number(7.0));
        assert_symmetric(&grid);
    }

    #[test]
    fn test_errors_flow_downstream() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_literal(addr("A1"), "0").unwrap();
        grid.set_formula(
            addr("B1"),
            Formula::arithmetic(Formula::literal(1), ArithOp::Divide, Formula::cell(addr("A1"))),
        )
        .unwrap();
        grid.set_formula(addr("C1"), Formula::cell(addr("B1"))).unwrap();
        grid.set_formula(
            addr("D1"),
            Formula::arithmetic(Formula::cell(addr("B1")), ArithOp::Add, Formula::literal(1)),
        )
        .unwrap();

        assert_eq!(value(&grid, "B1"), Value::Error(ErrorKind::DivideByZero));
        assert_eq!(value(&grid, "C1"), Value::Error(ErrorKind::DivideByZero));
        assert_eq!(value(&grid, "D1"), Value::Error(ErrorKind::InvalidOperand));

        grid.set_literal(addr("A1"), "4").unwrap();
        assert_eq!(value(&grid, "C1"), Value::Number(0.25));
        assert_eq!(value(&grid, "D1"), Value::Number(1.25));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_literal(addr("A1"), "2").unwrap();
        grid.set_formula(
            addr("B1"),
            Formula::arithmetic(Formula::cell(addr("A1")), ArithOp::Multiply, Formula::literal(3)),
        )
        .unwrap();

        let mut stats = PropagationStats::default();
        assert!(!grid.recompute(addr("B1"), &mut stats));
        let first = value(&grid, "B1");
        assert!(!grid.recompute(addr("B1"), &mut stats));
        assert_eq!(value(&grid, "B1"), first);
        assert!(stats.changed.is_empty());

        // Literal cells are left alone
        assert!(!grid.recompute(addr("A1"), &mut stats));
        assert_eq!(stats.recomputed, vec![addr("B1"), addr("B1")]);
    }

    #[test]
    fn test_long_chain_propagates_without_recursion() {
        let rows = 2_000;
        let mut grid = Grid::new(rows, 1).unwrap();
        grid.set_literal(CellAddress::new(0, 0), "0").unwrap();
        for row in 1..rows {
            grid.set_formula(
                CellAddress::new(row, 0),
                Formula::arithmetic(
                    Formula::cell(CellAddress::new(row - 1, 0)),
                    ArithOp::Add,
                    Formula::literal(1),
                ),
            )
            .unwrap();
        }

        let stats = grid.set_literal(CellAddress::new(0, 0), "10").unwrap();
        assert_eq!(stats.cells_recomputed(), rows as usize - 1);
        assert_eq!(
            grid.value(CellAddress::new(rows - 1, 0)).unwrap(),
            &Value::Number(10.0 + (rows - 1) as f64)
        );
    }

    #[test]
    fn test_linked_cells() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.set_literal(addr("A1"), "1").unwrap();
        grid.set_formula(addr("B1"), Formula::cell(addr("A1"))).unwrap();
        grid.set_formula(addr("B2"), Formula::sum(vec![])).unwrap();

        let linked: Vec<CellAddress> = grid.linked_cells().map(Cell::address).collect();
        assert_eq!(linked, vec![addr("A1"), addr("B1"), addr("B2")]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.set_literal(addr("A1"), "1").unwrap();
        let snapshot = grid.snapshot();
        grid.set_literal(addr("A1"), "2").unwrap();

        assert_eq!(snapshot.get(addr("A1")), Some(&Value::Number(1.0)));
        assert_eq!(grid.snapshot().get(addr("A1")), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_stacked_diamonds_evaluate_each_cell_once() {
        let levels = 20;
        let mut grid = Grid::new(levels + 1, 3).unwrap();
        grid.set_literal(CellAddress::new(0, 0), "1").unwrap();
        for row in 0..levels {
            let top = CellAddress::new(row, 0);
            let left = CellAddress::new(row, 1);
            let right = CellAddress::new(row, 2);
            grid.set_formula(
                left,
                Formula::arithmetic(Formula::cell(top), ArithOp::Add, Formula::literal(1)),
            )
            .unwrap();
            grid.set_formula(
                right,
                Formula::arithmetic(Formula::cell(top), ArithOp::Multiply, Formula::literal(2)),
            )
            .unwrap();
            grid.set_formula(CellAddress::new(row + 1, 0), Formula::sum(vec![left, right]))
                .unwrap();
        }

        let stats = grid.set_literal(CellAddress::new(0, 0), "2").unwrap();
        assert_eq!(stats.cells_recomputed(), 3 * levels as usize);
        let unique: AHashSet<CellAddress> = stats.recomputed.iter().copied().collect();
        assert_eq!(unique.len(), stats.recomputed.len());

        let mut expected = 2.0;
        for _ in 0..levels {
            expected = 3.0 * expected + 1.0;
        }
        assert_eq!(
            grid.value(CellAddress::new(levels, 0)).unwrap(),
            &Value::Number(expected)
        );
    }

    #[test]
    fn test_cells_behind_cycle_are_updated() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_literal(addr("B1"), "1").unwrap();
        grid.set_formula(addr("A1"), Formula::cell(addr("B1"))).unwrap();
        grid.set_formula(
            addr("C1"),
            Formula::arithmetic(Formula::cell(addr("A1")), ArithOp::Add, Formula::literal(1)),
        )
        .unwrap();
        assert_eq!(value(&grid, "C1"), Value::Number(2.0));

        grid.set_formula(addr("B1"), Formula::cell(addr("A1"))).unwrap();
        assert_eq!(value(&grid, "A1"), Value::Error(ErrorKind::Cycle));
        assert_eq!(value(&grid, "B1"), Value::Error(ErrorKind::Cycle));
        assert_eq!(value(&grid, "C1"), Value::Error(ErrorKind::Cycle));
    }

    #[test]
    fn test_overflow_settles() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set_literal(addr("A1"), "1e308").unwrap();
        grid.set_formula(
            addr("B1"),
            Formula::arithmetic(Formula::cell(addr("A1")), ArithOp::Multiply, Formula::literal(10)),
        )
        .unwrap();
        grid.set_formula(
            addr("C1"),
            Formula::arithmetic(
                Formula::cell(addr("B1")),
                ArithOp::Subtract,
                Formula::cell(addr("B1")),
            ),
        )
        .unwrap();
        grid.set_formula(addr("D1"), Formula::cell(addr("C1"))).unwrap();
        assert_eq!(value(&grid, "B1"), Value::Error(ErrorKind::InvalidOperand));
        assert_eq!(value(&grid, "C1"), Value::Error(ErrorKind::InvalidOperand));

        let mut stats = PropagationStats::default();
        assert!(!grid.recompute(addr("C1"), &mut stats));
        assert!(!grid.recompute(addr("C1"), &mut stats));

        let stats = grid.set_formula(addr("D1"), Formula::cell(addr("C1"))).unwrap();
        assert!(stats.changed.is_empty());

        let stats = grid.set_value(addr("A1"), f64::NAN).unwrap();
        assert_eq!(value(&grid, "A1"), Value::Error(ErrorKind::InvalidOperand));
        let stats_again = grid.set_value(addr("A1"), f64::NAN).unwrap();
        assert!(stats.was_changed(addr("A1")));
        assert!(stats_again.changed.is_empty());
    }
}
