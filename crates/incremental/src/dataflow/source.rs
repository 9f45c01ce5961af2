//! Inputs of a derived node.

use crate::dataflow::node::{DerivedNode, Node, Operator};
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::fmt;
use strata_core::{Error, Result, SchemaRef, Value};
use strata_reactive::{Listener, NodeId};
use strata_storage::scan::{ChunkScanner, ConstantScanner, ElementScanner};
use strata_storage::{RecordSet, ValueScan};

/// Where a node reads from.
///
/// Sources are held strongly: a derived node keeps its upstream alive, while
/// upstream producers hold their dependents weakly.
#[derive(Clone)]
pub enum Source {
    /// A plain record set.
    Records(RecordSet),
    /// The results of another derived node, applied before this node runs.
    Node(Rc<dyn DerivedNode>),
    /// A named value repeated for every row.
    Constant { name: String, value: Value },
}

impl Source {
    /// Creates a named constant source.
    pub fn constant(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Source::Constant {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the record set behind this source, if it has one.
    pub fn result_set(&self) -> Option<RecordSet> {
        match self {
            Source::Records(rs) => Some(rs.clone()),
            Source::Node(node) => Some(node.result_set().clone()),
            Source::Constant { .. } => None,
        }
    }

    /// Returns the record type behind this source, if it has one.
    pub fn schema(&self) -> Option<SchemaRef> {
        match self {
            Source::Records(rs) => Some(rs.schema().clone()),
            Source::Node(node) => Some(node.result_set().schema().clone()),
            Source::Constant { .. } => None,
        }
    }

    /// Returns true if this source exposes `column`.
    pub fn provides(&self, column: &str) -> bool {
        match self {
            Source::Constant { name, .. } => name == column,
            other => other.schema().is_some_and(|s| s.contains(column)),
        }
    }

    /// Returns the upstream node, if this source is one.
    pub fn node(&self) -> Option<&Rc<dyn DerivedNode>> {
        match self {
            Source::Node(node) => Some(node),
            _ => None,
        }
    }

    /// True if both sources read the same record set or constant.
    pub fn same_as(&self, other: &Source) -> bool {
        match (self.result_set(), other.result_set()) {
            (Some(a), Some(b)) => a.ptr_eq(&b),
            (None, None) => match (self, other) {
                (
                    Source::Constant { name: a, value: x },
                    Source::Constant { name: b, value: y },
                ) => a == b && x == y,
                _ => false,
            },
            _ => false,
        }
    }

    /// Returns the record set, failing for constants.
    pub(crate) fn require_records(&self, role: &str) -> Result<RecordSet> {
        self.result_set().ok_or_else(|| {
            Error::invalid_operation(alloc::format!("{} must be a record source", role))
        })
    }

    /// Scanner yielding one value of `column` per record.
    pub fn element_scanner(&self, column: &str) -> Result<Box<dyn ValueScan>> {
        match self {
            Source::Constant { value, .. } => Ok(Box::new(ConstantScanner::new(value.clone()))),
            other => {
                let rs = other.require_records("a column source")?;
                Ok(Box::new(ElementScanner::new(&rs, column)?))
            }
        }
    }

    /// Scanner yielding a tuple of `column` values per group.
    pub fn chunk_scanner(&self, column: &str) -> Result<Box<dyn ValueScan>> {
        match self {
            Source::Constant { value, .. } => Ok(Box::new(ConstantScanner::new(value.clone()))),
            other => {
                let rs = other.require_records("a column source")?;
                Ok(Box::new(ChunkScanner::new(&rs, column)?))
            }
        }
    }

    pub(crate) fn subscribe(&self, id: NodeId, listener: Weak<dyn Listener>) {
        if let Some(rs) = self.result_set() {
            rs.subscribe_weak(id, listener);
        }
    }

    pub(crate) fn unsubscribe(&self, id: NodeId) {
        if let Some(rs) = self.result_set() {
            rs.unsubscribe(id);
        }
    }
}

/// Finds the source that supplies `column`.
///
/// Later sources shadow earlier ones, so the search runs from the last source
/// to the first.
pub fn resolve<'a>(sources: &'a [Source], column: &str) -> Result<&'a Source> {
    sources
        .iter()
        .rev()
        .find(|source| source.provides(column))
        .ok_or_else(|| Error::column_not_found(column))
}

impl From<RecordSet> for Source {
    fn from(rs: RecordSet) -> Self {
        Source::Records(rs)
    }
}

impl From<&RecordSet> for Source {
    fn from(rs: &RecordSet) -> Self {
        Source::Records(rs.clone())
    }
}

impl From<Rc<dyn DerivedNode>> for Source {
    fn from(node: Rc<dyn DerivedNode>) -> Self {
        Source::Node(node)
    }
}

impl<O: Operator> From<Rc<Node<O>>> for Source {
    fn from(node: Rc<Node<O>>) -> Self {
        Source::Node(node)
    }
}

impl<O: Operator> From<&Rc<Node<O>>> for Source {
    fn from(node: &Rc<Node<O>>) -> Self {
        Source::Node(node.clone())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Records(rs) => f.debug_tuple("Records").field(rs).finish(),
            Source::Node(node) => f.debug_tuple("Node").field(&node.describe()).finish(),
            Source::Constant { name, value } => f
                .debug_struct("Constant")
                .field("name", name)
                .field("value", value)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn set(fields: &[&str]) -> RecordSet {
        RecordSet::with_fields(fields.iter().copied()).unwrap()
    }

    #[test]
    fn test_resolve_is_last_wins() {
        let first = set(&["a", "b"]);
        let second = set(&["b", "c"]);
        let sources = vec![Source::from(&first), Source::from(&second)];

        assert!(resolve(&sources, "a").unwrap().same_as(&Source::from(&first)));
        assert!(resolve(&sources, "b").unwrap().same_as(&Source::from(&second)));
        assert_eq!(
            resolve(&sources, "z").err(),
            Some(Error::column_not_found("z"))
        );
    }

    #[test]
    fn test_constant_source() {
        let source = Source::constant("k", 3);
        assert!(source.provides("k"));
        assert!(!source.provides("a"));
        assert!(source.result_set().is_none());

        let mut scanner = source.element_scanner("k").unwrap();
        assert_eq!(scanner.next_value(), Some(Value::from(3)));
        assert!(!scanner.is_bounded());
    }

    #[test]
    fn test_scanner_construction_fails_for_missing_column() {
        let rs = set(&["a"]);
        let source = Source::from(&rs);
        assert!(source.element_scanner("b").is_err());
        assert!(source.chunk_scanner("a").is_ok());
    }
}
