//! Grouping of consecutive records by a key field.

use crate::dataflow::{Node, Operator, Source};
use alloc::rc::Rc;
use alloc::vec::Vec;
use strata_core::{Record, Result, Value};
use strata_storage::scan::RecordScanner;
use strata_storage::{RecordSet, Scan};

/// Splits a record stream into runs of equal key.
///
/// A run that continues the key of the last stored group is folded into that
/// group instead of starting a new one.
pub struct Cluster {
    key: usize,
    scanner: RecordScanner,
}

impl Cluster {
    /// Wires a cluster of `source` on `key`.
    pub fn build(source: impl Into<Source>, key: &str) -> Result<Rc<Node<Cluster>>> {
        let source = source.into();
        let input = source.require_records("cluster source")?;
        let key = input.schema().resolve(key)?;
        let results = RecordSet::new(input.schema().clone());
        let cluster = Cluster {
            key,
            scanner: RecordScanner::new(&input),
        };
        Ok(Node::attach(alloc::vec![source], results, cluster))
    }

    fn key_of(&self, record: &Record) -> Value {
        record.get(self.key).cloned().unwrap_or(Value::Null)
    }
}

impl Operator for Cluster {
    fn kind(&self) -> &'static str {
        "cluster"
    }

    fn run(&mut self, results: &RecordSet) -> Result<()> {
        let mut runs: Vec<(Value, Vec<Record>)> = Vec::new();
        while let Some(record) = self.scanner.next() {
            let key = self.key_of(&record);
            match runs.last_mut() {
                Some((last, run)) if *last == key => run.push(record),
                _ => runs.push((key, alloc::vec![record])),
            }
        }
        if runs.is_empty() {
            return Ok(());
        }

        let trailing = results.last_record().map(|record| self.key_of(&record));
        if trailing.as_ref() == Some(&runs[0].0) {
            let (_, head) = runs.remove(0);
            results.amend_last_group(|group| group.extend(head))?;
        }
        if !runs.is_empty() {
            results.extend_record_groups(runs.into_iter().map(|(_, run)| run))?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.scanner.reset();
    }
}
