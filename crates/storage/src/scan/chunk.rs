//! Per-group field scanning.

use super::cursor::Cursor;
use super::ValueScan;
use crate::record_set::RecordSet;
use alloc::vec::Vec;
use strata_core::{Result, Value};

/// Yields one field's values for each group.
///
/// Empty groups yield an empty vector rather than being skipped.
pub struct ChunkScanner {
    cursor: Cursor,
    field: usize,
}

impl ChunkScanner {
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

impl Iterator for ChunkScanner {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Vec<Value>> {
        let group = self.cursor.next_group()?;
        Some(
            group
                .iter()
                .filter_map(|record| record.get(self.field).cloned())
                .collect(),
        )
    }
}

impl ValueScan for ChunkScanner {
    fn next_value(&mut self) -> Option<Value> {
        self.next().map(Value::Tuple)
    }
}

cursor_scan!(ChunkScanner, rewind_groups);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Scan;
    use alloc::vec;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|v| Value::Int64(*v)).collect()
    }

    fn grouped() -> RecordSet {
        let rs = RecordSet::with_fields(["a", "b"]).unwrap();
        rs.append(vec![ints(&[1, 10]), ints(&[2, 20])]).unwrap();
        rs.append(Vec::<Vec<Value>>::new()).unwrap();
        rs.append(vec![ints(&[3, 30])]).unwrap();
        rs
    }

    #[test]
    fn test_chunk_keeps_empty_groups() {
        let rs = grouped();
        let chunks: Vec<_> = ChunkScanner::new(&rs, "b").unwrap().collect();
        assert_eq!(chunks, vec![ints(&[10, 20]), vec![], ints(&[30])]);
    }

    #[test]
    fn test_chunk_rewind_is_per_group() {
        let rs = grouped();
        let mut scanner = ChunkScanner::new(&rs, "a").unwrap();
        assert_eq!(scanner.by_ref().count(), 3);
        assert!(scanner.is_exhausted());

        scanner.rewind(1);
        assert_eq!(scanner.next_value(), Some(Value::Tuple(ints(&[3]))));
        assert!(scanner.is_exhausted());

        scanner.reset();
        assert_eq!(scanner.next(), Some(ints(&[1, 2])));
    }
}
