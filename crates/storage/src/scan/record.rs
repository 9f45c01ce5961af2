//! Whole-record scanning.

use super::cursor::Cursor;
use crate::record_set::RecordSet;
use strata_core::Record;

/// Yields each record, across group boundaries.
pub struct RecordScanner {
    cursor: Cursor,
}

impl RecordScanner {
    /// Creates a scanner over every record of `source`.
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

impl Iterator for RecordScanner {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.cursor.next_record()
    }
}

cursor_scan!(RecordScanner, rewind_records);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Scan;
    use alloc::vec;
    use alloc::vec::Vec;
    use strata_core::Value;

    #[test]
    fn test_record_scanner_yields_records() {
        let rs = RecordSet::with_fields(["k", "v"]).unwrap();
        rs.append(vec![vec![Value::from(1), Value::from("x")]]).unwrap();
        rs.append(vec![vec![Value::from(2), Value::from("y")]]).unwrap();

        let mut scanner = RecordScanner::new(&rs);
        let records: Vec<_> = scanner.by_ref().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get_by_name("v"), Some(&Value::from("y")));

        scanner.rewind(1);
        assert_eq!(scanner.next().map(|r| r.values()[0].clone()), Some(Value::from(2)));
    }
}
