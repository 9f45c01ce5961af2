//! Lazily applied derived nodes.
//!
//! A `Node` owns a result `RecordSet` and an `Operator` that derives it from the
//! node's sources. Nothing runs when data arrives: an upstream change only marks
//! the node dirty and is forwarded to the node's own listeners. The operator runs
//! when somebody asks for the results.

use crate::dataflow::source::Source;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use strata_core::{Error, Record, Result};
use strata_reactive::{next_node_id, Change, Listener, NodeId, NotifyError};
use strata_storage::RecordSet;

/// The computation behind a node.
///
/// The operator owns its scanners. `run` reads whatever the scanners have not
/// consumed yet and writes into `results`; `debounce` realigns the scanners
/// after a successful run; `reset` rewinds everything for a full re-derive.
pub trait Operator: 'static {
    /// Short name used in logs and labels.
    fn kind(&self) -> &'static str;

    /// Consumes new input and appends to `results`.
    fn run(&mut self, results: &RecordSet) -> Result<()>;

    /// Realigns scanners after a lock-step pass.
    fn debounce(&mut self) {}

    /// Returns every scanner to the start of its source.
    fn reset(&mut self) {}
}

/// Object-safe view of a node, used for upstream links of any operator type.
pub trait DerivedNode {
    /// Returns the node ID, which is also its listener ID.
    fn node_id(&self) -> NodeId;

    /// Returns the operator name.
    fn kind(&self) -> &'static str;

    /// Brings the results up to date.
    fn apply(&self) -> Result<()>;

    /// Applies and returns the result set.
    fn results(&self) -> Result<RecordSet>;

    /// Returns the result set as it is, without applying.
    fn result_set(&self) -> &RecordSet;

    /// True if a source changed since the last apply.
    fn is_dirty(&self) -> bool;

    /// Returns a label such as `sweep (total)`.
    fn describe(&self) -> String;
}

/// A derived record set kept up to date on demand.
pub struct Node<O: Operator> {
    id: NodeId,
    kind: &'static str,
    sources: RefCell<Vec<Source>>,
    results: RecordSet,
    dirty: Cell<bool>,
    reset_pending: Cell<bool>,
    operator: RefCell<O>,
}

impl<O: Operator> Node<O> {
    /// Wires an operator into the graph as a listener of every source.
    ///
    /// The node starts dirty with empty results.
    pub fn attach(sources: Vec<Source>, results: RecordSet, operator: O) -> Rc<Self> {
        let node = Rc::new(Self {
            id: next_node_id(),
            kind: operator.kind(),
            sources: RefCell::new(Vec::new()),
            results,
            dirty: Cell::new(true),
            reset_pending: Cell::new(false),
            operator: RefCell::new(operator),
        });
        for source in sources {
            node.connect(source);
        }
        node
    }

    /// Returns the node ID.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the operator name.
    #[inline]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Applies every upstream node, then runs the operator if anything changed.
    ///
    /// On error the node stays dirty and the next apply retries.
    pub fn apply(&self) -> Result<()> {
        let upstream: Vec<Rc<dyn DerivedNode>> = self
            .sources
            .borrow()
            .iter()
            .filter_map(|source| source.node().cloned())
            .collect();
        for node in upstream {
            node.apply()?;
        }

        let mut operator = self
            .operator
            .try_borrow_mut()
            .map_err(|_| Error::invalid_operation(format!("{} applied while running", self.kind)))?;

        if self.reset_pending.replace(false) {
            tracing::trace!(node = self.id, kind = self.kind, "resetting");
            operator.reset();
            self.results.clear();
            self.dirty.set(true);
        }
        if !self.dirty.get() {
            return Ok(());
        }

        let before = self.results.len();
        operator.run(&self.results)?;
        operator.debounce();
        self.dirty.set(false);
        tracing::trace!(
            node = self.id,
            kind = self.kind,
            groups = self.results.len().saturating_sub(before),
            "applied"
        );
        Ok(())
    }

    /// Applies and returns a handle to the results.
    pub fn results(&self) -> Result<RecordSet> {
        self.apply()?;
        Ok(self.results.clone())
    }

    /// Applies and returns every result record, flattened.
    pub fn records(&self) -> Result<Vec<Record>> {
        self.apply()?;
        Ok(self.results.records().collect())
    }

    /// Returns the result set without applying.
    #[inline]
    pub fn result_set(&self) -> &RecordSet {
        &self.results
    }

    /// True if the next apply will run the operator.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get() || self.reset_pending.get()
    }

    /// Discards the results and re-derives them from scratch on the next apply.
    pub fn reset(&self) {
        self.reset_pending.set(true);
        self.dirty.set(true);
    }

    /// Returns a snapshot of the sources.
    pub fn sources(&self) -> Vec<Source> {
        self.sources.borrow().clone()
    }

    /// Returns `kind (field, ...)`.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.kind, self.results.schema().fields().join(", "))
    }

    /// Subscribes to `source` and adds it to the source list.
    pub(crate) fn connect(self: &Rc<Self>, source: Source) {
        let listener: Weak<dyn Listener> = Rc::downgrade(self) as Weak<Self>;
        source.subscribe(self.id, listener);
        self.sources.borrow_mut().push(source);
        self.dirty.set(true);
    }

    /// Removes every source matching `source`; returns how many were removed.
    pub(crate) fn disconnect(&self, source: &Source) -> usize {
        let mut sources = self.sources.borrow_mut();
        let before = sources.len();
        sources.retain(|existing| {
            let matched = existing.same_as(source);
            if matched {
                existing.unsubscribe(self.id);
            }
            !matched
        });
        before - sources.len()
    }

    /// Runs `edit` against the operator.
    pub(crate) fn with_operator<R>(&self, edit: impl FnOnce(&mut O) -> R) -> Result<R> {
        let mut operator = self
            .operator
            .try_borrow_mut()
            .map_err(|_| Error::invalid_operation(format!("{} is running", self.kind)))?;
        Ok(edit(&mut operator))
    }
}

impl<O: Operator> Listener for Node<O> {
    fn listener_id(&self) -> NodeId {
        self.id
    }

    fn update(&self, change: &Change) -> core::result::Result<(), NotifyError> {
        if change.is_reset() || change.is_amendment() {
            self.reset_pending.set(true);
        }
        self.dirty.set(true);
        self.results.notify(&change.forwarded());
        Ok(())
    }
}

impl<O: Operator> DerivedNode for Node<O> {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> &'static str {
        self.kind
    }

    fn apply(&self) -> Result<()> {
        Node::apply(self)
    }

    fn results(&self) -> Result<RecordSet> {
        Node::results(self)
    }

    fn result_set(&self) -> &RecordSet {
        &self.results
    }

    fn is_dirty(&self) -> bool {
        Node::is_dirty(self)
    }

    fn describe(&self) -> String {
        Node::describe(self)
    }
}

impl<O: Operator> Drop for Node<O> {
    fn drop(&mut self) {
        for source in self.sources.get_mut().iter() {
            source.unsubscribe(self.id);
        }
    }
}

impl<O: Operator> fmt::Debug for Node<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("dirty", &self.is_dirty())
            .field("results", &self.results)
            .finish()
    }
}
