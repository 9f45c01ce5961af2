//! Grouped record storage.
//!
//! This module provides `RecordSet`, an append-only list of immutable record groups
//! sharing one `RecordType`. A `RecordSet` is a cheap, cloneable handle; clones
//! share the same groups and listeners. Every mutation notifies subscribed
//! listeners after the borrow on the groups has been released.

use crate::column::ColumnView;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Ref, RefCell};
use strata_core::{Error, Record, RecordType, Result, SchemaRef, Value};
use strata_reactive::{next_node_id, Change, Listener, ListenerSet, NodeId};

/// One atomic batch of records.
pub type RecordGroup = Rc<[Record]>;

struct Inner {
    id: NodeId,
    schema: SchemaRef,
    groups: RefCell<Vec<RecordGroup>>,
    listeners: RefCell<ListenerSet>,
}

/// Shared handle to an append-only list of record groups.
///
/// # Example
///
/// ```rust
/// use strata_storage::RecordSet;
/// use strata_core::Value;
///
/// let rs = RecordSet::with_fields(["a", "b"]).unwrap();
/// rs.append(vec![
///     vec![Value::Int64(1), Value::Int64(0)],
///     vec![Value::Int64(2), Value::Int64(1)],
/// ]).unwrap();
/// rs.append(vec![vec![Value::Int64(3), Value::Int64(0)]]).unwrap();
///
/// assert_eq!(rs.len(), 2);
/// assert_eq!(rs.record_count(), 3);
/// assert_eq!(rs.get(-1).unwrap().get(0), Some(&Value::Int64(3)));
/// ```
#[derive(Clone)]
pub struct RecordSet {
    inner: Rc<Inner>,
}

/// Non-owning handle to a `RecordSet`, held by scanners.
#[derive(Clone)]
pub struct WeakRecordSet {
    inner: Weak<Inner>,
}

impl WeakRecordSet {
    /// Returns the record set if it is still alive.
    pub fn upgrade(&self) -> Option<RecordSet> {
        self.inner.upgrade().map(|inner| RecordSet { inner })
    }
}

/// Clamps optional slice bounds to `0..=len`; negative bounds count from the end.
pub fn slice_bounds(len: usize, start: Option<isize>, stop: Option<isize>) -> (usize, usize) {
    let clamp = |bound: isize| -> usize {
        if bound < 0 {
            let from_end = bound.unsigned_abs();
            len.saturating_sub(from_end)
        } else {
            (bound as usize).min(len)
        }
    };
    let start = start.map(clamp).unwrap_or(0);
    let stop = stop.map(clamp).unwrap_or(len);
    (start, stop.max(start))
}

impl RecordSet {
    /// Creates an empty record set of the given type.
    pub fn new(schema: SchemaRef) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: next_node_id(),
                schema,
                groups: RefCell::new(Vec::new()),
                listeners: RefCell::new(ListenerSet::new()),
            }),
        }
    }

    /// Creates an empty record set from field names.
    pub fn with_fields<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<alloc::string::String>,
    {
        Ok(Self::new(RecordType::shared(fields)?))
    }

    /// Creates a record set holding `rows` as its first group.
    pub fn from_rows<I>(schema: SchemaRef, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let rs = Self::new(schema);
        let group = rs.coerce_rows(rows)?;
        rs.inner.groups.borrow_mut().push(group);
        Ok(rs)
    }

    /// Creates a record set holding each entry of `groups` as one group.
    pub fn from_groups<I, G>(schema: SchemaRef, groups: I) -> Result<Self>
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = Vec<Value>>,
    {
        let rs = Self::new(schema);
        for group in groups {
            let group = rs.coerce_rows(group)?;
            rs.inner.groups.borrow_mut().push(group);
        }
        Ok(rs)
    }

    /// Creates a record set whose type is taken from the first record.
    ///
    /// All records form one group. Fails on an empty list.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let first = records
            .first()
            .ok_or_else(|| Error::invalid_operation("cannot infer a record type from no records"))?;
        let rs = Self::new(first.schema().clone());
        let group = rs.coerce_records(records)?;
        rs.inner.groups.borrow_mut().push(group);
        Ok(rs)
    }

    /// Creates a new record set sharing this one's groups but not its listeners.
    pub fn duplicate(&self) -> Self {
        let rs = Self::new(self.inner.schema.clone());
        *rs.inner.groups.borrow_mut() = self.inner.groups.borrow().clone();
        rs
    }

    /// Returns the producer ID used as the origin of notifications.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// Returns the record type.
    #[inline]
    pub fn schema(&self) -> &SchemaRef {
        &self.inner.schema
    }

    /// Returns a non-owning handle.
    pub fn downgrade(&self) -> WeakRecordSet {
        WeakRecordSet {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns true if both handles point to the same record set.
    #[inline]
    pub fn ptr_eq(&self, other: &RecordSet) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn coerce_rows<I>(&self, rows: I) -> Result<RecordGroup>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        rows.into_iter()
            .map(|values| Record::new(self.inner.schema.clone(), values))
            .collect::<Result<Vec<_>>>()
            .map(Into::into)
    }

    fn coerce_records<I>(&self, records: I) -> Result<RecordGroup>
    where
        I: IntoIterator<Item = Record>,
    {
        records
            .into_iter()
            .map(|record| {
                if Rc::ptr_eq(record.schema(), &self.inner.schema) {
                    Ok(record)
                } else {
                    record.with_schema(self.inner.schema.clone())
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(Into::into)
    }

    fn push_groups(&self, groups: Vec<RecordGroup>) {
        let count = groups.len();
        self.inner.groups.borrow_mut().extend(groups);
        tracing::trace!(record_set = self.inner.id, groups = count, "appended groups");
        self.notify(&Change::appended(self.inner.id, count));
    }

    /// Appends one group built from value rows.
    pub fn append<I>(&self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let group = self.coerce_rows(rows)?;
        self.push_groups(alloc::vec![group]);
        Ok(())
    }

    /// Appends one group of records, rebinding them to this record type.
    pub fn append_records<I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Record>,
    {
        let group = self.coerce_records(records)?;
        self.push_groups(alloc::vec![group]);
        Ok(())
    }

    /// Appends a single record as a singleton group.
    pub fn append_record(&self, record: Record) -> Result<()> {
        self.append_records(core::iter::once(record))
    }

    /// Appends many groups with a single notification.
    pub fn extend_groups<I, G>(&self, groups: I) -> Result<()>
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = Vec<Value>>,
    {
        let groups = groups
            .into_iter()
            .map(|group| self.coerce_rows(group))
            .collect::<Result<Vec<_>>>()?;
        self.push_groups(groups);
        Ok(())
    }

    /// Appends many groups of records with a single notification.
    pub fn extend_record_groups<I>(&self, groups: I) -> Result<()>
    where
        I: IntoIterator<Item = Vec<Record>>,
    {
        let groups = groups
            .into_iter()
            .map(|group| self.coerce_records(group))
            .collect::<Result<Vec<_>>>()?;
        self.push_groups(groups);
        Ok(())
    }

    /// Appends every group of another record set of the identical record type.
    pub fn extend(&self, other: &RecordSet) -> Result<()> {
        if other.schema() != self.schema() {
            return Err(Error::schema_mismatch(
                self.schema().describe(),
                other.schema().describe(),
            ));
        }
        let groups = other.groups();
        self.push_groups(groups);
        Ok(())
    }

    /// Replaces the trailing group with an edited copy of it.
    ///
    /// This is the only in-place edit; derived nodes use it to continue their last
    /// output group across apply cycles. Fails when there is no group yet.
    pub fn amend_last_group<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Record>),
    {
        {
            let mut groups = self.inner.groups.borrow_mut();
            let last = groups
                .last_mut()
                .ok_or_else(|| Error::invalid_operation("no group to amend"))?;
            let mut records = last.to_vec();
            edit(&mut records);
            *last = self.coerce_records(records)?;
        }
        tracing::trace!(record_set = self.inner.id, "amended last group");
        self.notify(&Change::amended(self.inner.id));
        Ok(())
    }

    /// Removes every group and tells listeners to re-derive from scratch.
    pub fn clear(&self) {
        self.inner.groups.borrow_mut().clear();
        tracing::trace!(record_set = self.inner.id, "cleared");
        self.notify(&Change::cleared(self.inner.id));
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.inner.groups.borrow().len()
    }

    /// Returns true if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.inner.groups.borrow().is_empty()
    }

    /// Returns the number of records across all groups.
    pub fn record_count(&self) -> usize {
        self.inner.groups.borrow().iter().map(|g| g.len()).sum()
    }

    /// Returns the group at `index`.
    pub fn group(&self, index: usize) -> Option<RecordGroup> {
        self.inner.groups.borrow().get(index).cloned()
    }

    /// Returns all groups. Groups are shared, not copied.
    pub fn groups(&self) -> Vec<RecordGroup> {
        self.inner.groups.borrow().clone()
    }

    /// Borrows the groups for the duration of a scanner step.
    pub(crate) fn borrow_groups(&self) -> Ref<'_, Vec<RecordGroup>> {
        self.inner.groups.borrow()
    }

    /// Returns the last record of the last non-empty group.
    pub fn last_record(&self) -> Option<Record> {
        self.records_rev().next()
    }

    /// Iterates records across groups, front to back.
    pub fn records(&self) -> Records {
        Records {
            groups: self.groups(),
            front: (0, 0),
            back: None,
        }
    }

    /// Iterates records across groups, back to front.
    pub fn records_rev(&self) -> core::iter::Rev<Records> {
        self.records().rev()
    }

    /// Returns the record at an absolute index; negative indices count from the end.
    pub fn get(&self, index: isize) -> Result<Record> {
        let available = self.record_count();
        let found = if index >= 0 {
            self.records().nth(index as usize)
        } else {
            self.records_rev().nth(index.unsigned_abs() - 1)
        };
        found.ok_or_else(|| Error::index_out_of_range(index, available))
    }

    /// Returns records in `start..stop` of the flattened sequence, in forward order.
    pub fn slice(&self, start: Option<isize>, stop: Option<isize>) -> Vec<Record> {
        let (start, stop) = slice_bounds(self.record_count(), start, stop);
        self.records().skip(start).take(stop - start).collect()
    }

    /// Returns a lazy per-group view of one column.
    pub fn column(&self, name: &str) -> Result<ColumnView> {
        let index = self.schema().resolve(name)?;
        Ok(ColumnView::new(self.clone(), index))
    }

    /// `(column, slice)` addressing: the column's values for groups `start..stop`.
    pub fn column_slice(
        &self,
        name: &str,
        start: Option<isize>,
        stop: Option<isize>,
    ) -> Result<Vec<Vec<Value>>> {
        Ok(self.column(name)?.slice(start, stop))
    }

    /// Returns true if any group holds a record equal to `record`.
    pub fn contains(&self, record: &Record) -> bool {
        self.group_position(record).is_some()
    }

    /// Returns the number of records equal to `record`.
    pub fn count(&self, record: &Record) -> usize {
        self.records().filter(|r| r == record).count()
    }

    /// Returns the index of the first group holding a record equal to `record`.
    pub fn group_position(&self, record: &Record) -> Option<usize> {
        self.inner
            .groups
            .borrow()
            .iter()
            .position(|group| group.iter().any(|r| r == record))
    }

    /// Subscribes a listener; the record set holds it weakly.
    pub fn subscribe<L>(&self, listener: &Rc<L>)
    where
        L: Listener + 'static,
    {
        self.inner.listeners.borrow_mut().subscribe(listener);
    }

    /// Subscribes an already-downgraded listener.
    pub fn subscribe_weak(&self, id: NodeId, listener: Weak<dyn Listener>) {
        self.inner.listeners.borrow_mut().subscribe_weak(id, listener);
    }

    /// Unsubscribes a listener by ID.
    pub fn unsubscribe(&self, id: NodeId) -> bool {
        self.inner.listeners.borrow_mut().unsubscribe(id)
    }

    /// Returns the number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Pushes a change to every live listener.
    pub fn notify(&self, change: &Change) {
        let live = self.inner.listeners.borrow_mut().live();
        ListenerSet::dispatch(&live, change);
    }
}

impl core::fmt::Debug for RecordSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordSet")
            .field("id", &self.inner.id)
            .field("schema", &self.inner.schema)
            .field("groups", &self.len())
            .finish()
    }
}

/// Double-ended iterator over the records of a snapshot of groups.
pub struct Records {
    groups: Vec<RecordGroup>,
    front: (usize, usize),
    /// Exclusive back position, resolved lazily.
    back: Option<(usize, usize)>,
}

impl Records {
    fn back(&mut self) -> (usize, usize) {
        let groups = &self.groups;
        *self.back.get_or_insert_with(|| (groups.len(), 0))
    }

    fn exhausted(&mut self) -> bool {
        let back = self.back();
        self.front >= back
    }
}

impl Iterator for Records {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            if self.exhausted() {
                return None;
            }
            let (g, r) = self.front;
            let group = &self.groups[g];
            if r < group.len() {
                self.front = (g, r + 1);
                return Some(group[r].clone());
            }
            self.front = (g + 1, 0);
        }
    }
}

impl DoubleEndedIterator for Records {
    fn next_back(&mut self) -> Option<Record> {
        loop {
            if self.exhausted() {
                return None;
            }
            let (g, r) = self.back();
            if r > 0 {
                self.back = Some((g, r - 1));
                return Some(self.groups[g][r - 1].clone());
            }
            // step into the previous group from its end
            let prev = g - 1;
            self.back = Some((prev, self.groups[prev].len()));
            if self.exhausted() {
                return None;
            }
        }
    }
}
