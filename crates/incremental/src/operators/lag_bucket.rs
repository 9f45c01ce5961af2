//! Pairing records with an earlier record of the same stream.

use crate::dataflow::{Node, Operator, Source};
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use strata_core::{Error, Record, Result, Value};
use strata_storage::scan::RecordScanner;
use strata_storage::{RecordSet, Scan};

/// Emits `(prior, current)` for every field, where `prior` is the record `lag`
/// positions back. The first `lag` records are only buffered.
pub struct LagBucket {
    lag: usize,
    scanner: RecordScanner,
    buffer: VecDeque<Record>,
}

impl LagBucket {
    /// Wires a lag bucket over `source`. `lag` must be at least one.
    pub fn build(source: impl Into<Source>, lag: usize) -> Result<Rc<Node<LagBucket>>> {
        if lag == 0 {
            return Err(Error::invalid_operation("lag must be at least 1"));
        }
        let source = source.into();
        let input = source.require_records("lag bucket source")?;
        let results = RecordSet::new(input.schema().clone());
        let bucket = LagBucket {
            lag,
            scanner: RecordScanner::new(&input),
            buffer: VecDeque::with_capacity(lag),
        };
        Ok(Node::attach(alloc::vec![source], results, bucket))
    }

    /// Returns the lag.
    #[inline]
    pub fn lag(&self) -> usize {
        self.lag
    }
}

impl Operator for LagBucket {
    fn kind(&self) -> &'static str {
        "lag bucket"
    }

    fn run(&mut self, results: &RecordSet) -> Result<()> {
        let mut pairs = Vec::new();
        for record in self.scanner.by_ref() {
            if self.buffer.len() == self.lag {
                if let Some(prior) = self.buffer.pop_front() {
                    let values = prior
                        .values()
                        .iter()
                        .zip(record.values())
                        .map(|(last, this)| Value::Tuple(alloc::vec![last.clone(), this.clone()]))
                        .collect();
                    pairs.push(Record::new(results.schema().clone(), values)?);
                }
            }
            self.buffer.push_back(record);
        }
        if !pairs.is_empty() {
            results.append_records(pairs)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.scanner.reset();
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn pair(a: i64, b: i64) -> Value {
        Value::Tuple(vec![Value::from(a), Value::from(b)])
    }

    #[test]
    fn test_lag_bucket_pairs() {
        let rs = RecordSet::with_fields(["v"]).unwrap();
        rs.append(vec![vec![Value::from(1)], vec![Value::from(2)]])
            .unwrap();
        let node = LagBucket::build(&rs, 2).unwrap();
        assert!(node.results().unwrap().is_empty());

        rs.append(vec![vec![Value::from(3)], vec![Value::from(4)]])
            .unwrap();
        let records = node.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(0), Some(&pair(1, 3)));
        assert_eq!(records[1].get(0), Some(&pair(2, 4)));
    }

    #[test]
    fn test_lag_bucket_rejects_zero_lag() {
        let rs = RecordSet::with_fields(["v"]).unwrap();
        assert!(LagBucket::build(&rs, 0).is_err());
    }
}
