//! Column projection of a record set.

use crate::record_set::{slice_bounds, RecordGroup, RecordSet};
use alloc::string::String;
use alloc::vec::Vec;
use strata_core::Value;

/// Lazy view of one field across the groups of a record set.
///
/// The view reads the record set at the time of each call, so groups appended
/// after the view was created are visible through it.
#[derive(Clone, Debug)]
pub struct ColumnView {
    source: RecordSet,
    index: usize,
}

impl ColumnView {
    pub(crate) fn new(source: RecordSet, index: usize) -> Self {
        Self { source, index }
    }

    /// Returns the field name.
    pub fn name(&self) -> String {
        self.source
            .schema()
            .field(self.index)
            .map(String::from)
            .unwrap_or_default()
    }

    /// Returns the field position.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Returns true if the record set has no groups.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    fn project(&self, group: &RecordGroup) -> Vec<Value> {
        group
            .iter()
            .map(|record| record.values()[self.index].clone())
            .collect()
    }

    /// Returns the column's values within one group.
    pub fn group(&self, index: usize) -> Option<Vec<Value>> {
        self.source.group(index).map(|g| self.project(&g))
    }

    /// Iterates the column group by group.
    pub fn iter(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        self.source
            .groups()
            .into_iter()
            .map(move |g| self.project(&g))
    }

    /// Returns the column's values for groups `start..stop`.
    pub fn slice(&self, start: Option<isize>, stop: Option<isize>) -> Vec<Vec<Value>> {
        let groups = self.source.groups();
        let (start, stop) = slice_bounds(groups.len(), start, stop);
        groups[start..stop].iter().map(|g| self.project(g)).collect()
    }

    /// Returns every group's values.
    pub fn to_vec(&self) -> Vec<Vec<Value>> {
        self.iter().collect()
    }

    /// Returns the column's values flattened across groups.
    pub fn values(&self) -> Vec<Value> {
        self.iter().flatten().collect()
    }
}
