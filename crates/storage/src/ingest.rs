//! Schema ingestion from host tabular datasets.

use crate::record_set::RecordSet;
use alloc::string::String;
use alloc::vec::Vec;
use strata_core::{RecordType, Result, Value};

/// A row-major table owned by a host platform.
///
/// Adapters implement this to hand a dataset to strata; the columns become the
/// record type and the rows become the first group.
pub trait TabularSource {
    /// Returns the column names in order.
    fn column_names(&self) -> Vec<String>;

    /// Returns the number of rows.
    fn row_count(&self) -> usize;

    /// Returns the cell at `row`, `column`.
    fn value_at(&self, row: usize, column: usize) -> Value;
}

impl RecordSet {
    /// Builds a record set from a tabular dataset, as a single initial group.
    pub fn from_source<T>(source: &T) -> Result<RecordSet>
    where
        T: TabularSource + ?Sized,
    {
        let schema = RecordType::shared(source.column_names())?;
        let width = schema.len();
        let rows = (0..source.row_count())
            .map(|row| (0..width).map(|col| source.value_at(row, col)).collect::<Vec<_>>());
        RecordSet::from_rows(schema, rows)
    }
}
