//! Detached copy of grid values

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::{CellAddress, Value};

/// Every value of a grid at one moment, row by row
///
/// A snapshot owns its values, so it stays valid after the grid changes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    rows: u32,
    cols: u16,
    values: Vec<Value>,
}

impl Snapshot {
    pub(crate) fn new(rows: u32, cols: u16, values: Vec<Value>) -> Self {
        debug_assert_eq!(values.len(), rows as usize * cols as usize);
        Self { rows, cols, values }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Get the value at `addr`, or `None` outside the grid
    pub fn get(&self, addr: CellAddress) -> Option<&Value> {
        if addr.row >= self.rows || addr.col >= self.cols {
            return None;
        }
        self.values
            .get(addr.row as usize * self.cols as usize + addr.col as usize)
    }

    /// Get one row's values, left to right
    pub fn row(&self, row: u32) -> Option<&[Value]> {
        if row >= self.rows {
            return None;
        }
        let width = self.cols as usize;
        let start = row as usize * width;
        self.values.get(start..start + width)
    }

    /// Iterate over rows
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Value]> {
        self.values.chunks(self.cols as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let snapshot = Snapshot::new(
            2,
            2,
            vec![
                Value::Number(1.0),
                Value::text("a"),
                Value::empty(),
                Value::Number(4.0),
            ],
        );

        assert_eq!(snapshot.get(CellAddress::new(0, 1)), Some(&Value::text("a")));
        assert_eq!(snapshot.get(CellAddress::new(1, 1)), Some(&Value::Number(4.0)));
        assert_eq!(snapshot.get(CellAddress::new(0, 2)), None);
        assert_eq!(snapshot.get(CellAddress::new(2, 0)), None);
        assert_eq!(snapshot.row(1).map(|r| r.len()), Some(2));
        assert_eq!(snapshot.row(2), None);
        assert_eq!(snapshot.iter_rows().count(), 2);
    }
}
