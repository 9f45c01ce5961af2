//! Regrouping one record stream along another's group boundaries.

use crate::dataflow::{Node, Operator, Source};
use alloc::rc::Rc;
use alloc::vec::Vec;
use strata_core::{Record, Result};
use strata_storage::scan::{GroupScanner, RecordScanner, ReplayingGroupScanner, ReplayingRecordScanner};
use strata_storage::{RecordSet, Scan};

/// Emits the records of `target` cut into groups the size of `source`'s groups.
///
/// A group is emitted only when the target can fill it completely. Otherwise
/// both scanners stay anchored before it and the whole group is tried again on
/// the next apply.
pub struct Regroup {
    boundaries: ReplayingGroupScanner,
    records: ReplayingRecordScanner,
}

impl Regroup {
    /// Wires a regroup of `target`'s records along `source`'s groups.
    pub fn build(source: impl Into<Source>, target: impl Into<Source>) -> Result<Rc<Node<Regroup>>> {
        let source = source.into();
        let target = target.into();
        let boundaries = source.require_records("regroup source")?;
        let records = target.require_records("regroup target")?;
        let results = RecordSet::new(records.schema().clone());
        let regroup = Regroup {
            boundaries: GroupScanner::new(&boundaries).into(),
            records: RecordScanner::new(&records).into(),
        };
        Ok(Node::attach(alloc::vec![source, target], results, regroup))
    }
}

impl Operator for Regroup {
    fn kind(&self) -> &'static str {
        "regroup"
    }

    fn run(&mut self, results: &RecordSet) -> Result<()> {
        self.boundaries.replay();
        self.records.replay();

        let mut groups: Vec<Vec<Record>> = Vec::new();
        while let Some(group) = self.boundaries.live().next() {
            let wanted = group.len();
            let taken: Vec<Record> = self.records.live().take(wanted).collect();
            if taken.len() < wanted {
                tracing::debug!(
                    wanted,
                    available = taken.len(),
                    "regroup withholding incomplete group"
                );
                break;
            }
            groups.push(taken);
            self.boundaries.anchor();
            self.records.anchor();
        }
        if !groups.is_empty() {
            results.extend_record_groups(groups)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.boundaries.reset();
        self.records.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use strata_core::Value;

    fn sized(field: &str, sizes: &[usize], start: i64) -> RecordSet {
        let rs = RecordSet::with_fields([field]).unwrap();
        let mut next = start;
        for size in sizes {
            let group: Vec<Vec<Value>> = (0..*size)
                .map(|_| {
                    next += 1;
                    vec![Value::from(next - 1)]
                })
                .collect();
            rs.append(group).unwrap();
        }
        rs
    }

    fn sizes(rs: &RecordSet) -> Vec<usize> {
        rs.groups().iter().map(|g| g.len()).collect()
    }

    #[test]
    fn test_regroup_follows_source_boundaries() {
        let source = sized("s", &[2, 1], 0);
        let target = sized("t", &[1, 1, 1], 10);
        let node = Regroup::build(&source, &target).unwrap();
        let results = node.results().unwrap();
        assert_eq!(sizes(&results), vec![2, 1]);
        assert_eq!(results.schema().fields(), &["t"]);
        assert_eq!(results.get(2).unwrap().get(0), Some(&Value::from(12)));
    }

    #[test]
    fn test_regroup_keeps_empty_groups() {
        let source = sized("s", &[1, 0, 1], 0);
        let target = sized("t", &[2], 0);
        let node = Regroup::build(&source, &target).unwrap();
        assert_eq!(sizes(&node.results().unwrap()), vec![1, 0, 1]);
    }
}
