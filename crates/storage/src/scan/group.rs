//! Whole-group scanning.

use super::cursor::Cursor;
use crate::record_set::{RecordGroup, RecordSet};

/// Yields each group of records, including empty ones.
pub struct GroupScanner {
    cursor: Cursor,
}

impl GroupScanner {
    /// Creates a scanner over every group of `source`.
    pub fn new(source: &RecordSet) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Returns the scanned record set, if it is still alive.
    pub fn source(&self) -> Option<RecordSet> {
        self.cursor.source()
    }
}

impl Iterator for GroupScanner {
    type Item = RecordGroup;

    fn next(&mut self) -> Option<RecordGroup> {
        self.cursor.next_group()
    }
}

cursor_scan!(GroupScanner, rewind_groups);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{Position, Scan};
    use alloc::vec;
    use alloc::vec::Vec;
    use strata_core::Value;

    #[test]
    fn test_group_scanner() {
        let rs = RecordSet::with_fields(["a"]).unwrap();
        rs.append(vec![vec![Value::from(1)], vec![Value::from(2)]]).unwrap();
        rs.append(Vec::<Vec<Value>>::new()).unwrap();

        let mut scanner = GroupScanner::new(&rs);
        let sizes: Vec<_> = scanner.by_ref().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![2, 0]);
        assert_eq!(scanner.position(), Position::new(2, 0));

        scanner.rewind(5);
        assert_eq!(scanner.position(), Position::default());
    }
}
