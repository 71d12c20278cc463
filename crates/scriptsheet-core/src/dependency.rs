//! Circular reference detection
//!
//! Walks parent links depth-first from a cell. Only a cell reached again
//! while it is still on the current path is a cycle; reaching a cell twice
//! through sibling branches (a diamond) is not.

use ahash::AHashSet;

use crate::cell::CellAddress;
use crate::grid::Grid;

/// Find a circular reference upstream of `start`
///
/// Returns the path from `start` to the repeated cell, which appears twice
/// (first where the loop begins, last where it closes), or `None` when every
/// cell `start` depends on eventually bottoms out in literals.
pub fn find_cycle(grid: &Grid, start: CellAddress) -> Option<Vec<CellAddress>> {
    let mut on_path: AHashSet<CellAddress> = AHashSet::new();
    let mut finished: AHashSet<CellAddress> = AHashSet::new();
    let mut path: Vec<CellAddress> = Vec::new();
    // Each frame holds the parents still to visit for the cell at that depth
    let mut stack: Vec<Vec<CellAddress>> = Vec::new();

    on_path.insert(start);
    path.push(start);
    stack.push(pending_parents(grid, start));

    while let Some(pending) = stack.last_mut() {
        match pending.pop() {
            Some(next) => {
                if on_path.contains(&next) {
                    path.push(next);
                    return Some(path);
                }
                if finished.contains(&next) {
                    continue;
                }
                on_path.insert(next);
                path.push(next);
                stack.push(pending_parents(grid, next));
            }
            None => {
                stack.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(&done);
                    finished.insert(done);
                }
            }
        }
    }

    None
}

/// Parents of `addr`, reversed so popping visits them in row-major order
fn pending_parents(grid: &Grid, addr: CellAddress) -> Vec<CellAddress> {
    let mut parents = grid
        .cell(addr)
        .map(|cell| cell.parents())
        .unwrap_or_default();
    parents.reverse();
    parents
}
