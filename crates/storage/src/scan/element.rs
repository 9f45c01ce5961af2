//! Per-record field scanning.

use super::cursor::Cursor;
use super::ValueScan;
use crate::record_set::RecordSet;
use strata_core::{Result, Value};

/// Yields one field's value for each record, across group boundaries.
pub struct ElementScanner {
    cursor: Cursor,
    field: usize,
}

impl ElementScanner {
    /// Creates a scanner over the named field.
    pub fn new(source: &RecordSet, field: &str) -> Result<Self> {
        let field = source.schema().resolve(field)?;
        Ok(Self {
            cursor: Cursor::new(source),
            field,
        })
    }

    /// Returns the position of the scanned field.
    #[inline]
    pub fn field(&self) -> usize {
        self.field
    }

    /// Returns the scanned record set, if it is still alive.
    pub fn source(&self) -> Option<RecordSet> {
        self.cursor.source()
    }
}

impl Iterator for ElementScanner {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let record = self.cursor.next_record()?;
        record.get(self.field).cloned()
    }
}

impl ValueScan for ElementScanner {
    fn next_value(&mut self) -> Option<Value> {
        self.next()
    }
}

cursor_scan!(ElementScanner, rewind_records);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{Position, Scan};
    use alloc::vec;
    use alloc::vec::Vec;

    fn grouped() -> RecordSet {
        let rs = RecordSet::with_fields(["a"]).unwrap();
        for chunk in [vec![1i64, 2, 3], vec![], vec![4, 5]] {
            rs.append(chunk.iter().map(|v| vec![Value::Int64(*v)]).collect::<Vec<_>>())
                .unwrap();
        }
        rs
    }

    #[test]
    fn test_element_crosses_groups() {
        let rs = grouped();
        let scanner = ElementScanner::new(&rs, "a").unwrap();
        let values: Vec<_> = scanner.collect();
        assert_eq!(values, [1, 2, 3, 4, 5].map(Value::from).to_vec());
    }

    #[test]
    fn test_element_resumes_after_partial_read() {
        let rs = grouped();
        let mut scanner = ElementScanner::new(&rs, "a").unwrap();
        assert_eq!(scanner.next(), Some(Value::Int64(1)));
        assert_eq!(scanner.next(), Some(Value::Int64(2)));
        assert_eq!(scanner.position(), Position::new(0, 2));

        // the last record of a group moves the cursor to the next group
        assert_eq!(scanner.next(), Some(Value::Int64(3)));
        assert_eq!(scanner.position(), Position::new(1, 0));
        assert!(!scanner.is_exhausted());
    }

    #[test]
    fn test_element_rewind_skips_empty_groups() {
        let rs = grouped();
        let mut scanner = ElementScanner::new(&rs, "a").unwrap();
        assert_eq!(scanner.by_ref().count(), 5);
        assert!(scanner.is_exhausted());

        scanner.rewind(3);
        assert_eq!(scanner.next(), Some(Value::Int64(3)));

        scanner.rewind(10);
        assert_eq!(scanner.position(), Position::default());
        assert_eq!(scanner.next(), Some(Value::Int64(1)));
    }

    #[test]
    fn test_element_sees_appends_after_exhaustion() {
        let rs = grouped();
        let mut scanner = ElementScanner::new(&rs, "a").unwrap();
        assert_eq!(scanner.by_ref().count(), 5);
        assert_eq!(scanner.next(), None);

        rs.append(vec![vec![Value::Int64(6)]]).unwrap();
        assert!(!scanner.is_exhausted());
        assert_eq!(scanner.next(), Some(Value::Int64(6)));
    }

    #[test]
    fn test_element_unknown_field() {
        let rs = grouped();
        assert!(ElementScanner::new(&rs, "missing").is_err());
    }

    #[test]
    fn test_element_source_dropped() {
        let rs = grouped();
        let mut scanner = ElementScanner::new(&rs, "a").unwrap();
        drop(rs);
        assert!(scanner.source().is_none());
        assert!(scanner.is_exhausted());
        assert_eq!(scanner.next(), None);
    }
}
