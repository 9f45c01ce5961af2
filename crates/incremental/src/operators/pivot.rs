//! Row-major to column-major rotation of groups.

use crate::dataflow::{Node, Operator, Source};
use alloc::rc::Rc;
use alloc::vec::Vec;
use strata_core::{Record, Result, Value};
use strata_storage::scan::GroupScanner;
use strata_storage::{RecordSet, Scan};

/// Turns each group into a single record of per-field tuples.
///
/// `[(a=4, b=3), (a=6, b=5)]` becomes `[(a=(4, 6), b=(3, 5))]`. Empty groups
/// produce nothing.
pub struct Pivot {
    scanner: GroupScanner,
}

impl Pivot {
    /// Wires a pivot of `source`.
    pub fn build(source: impl Into<Source>) -> Result<Rc<Node<Pivot>>> {
        let source = source.into();
        let input = source.require_records("pivot source")?;
        let results = RecordSet::new(input.schema().clone());
        let pivot = Pivot {
            scanner: GroupScanner::new(&input),
        };
        Ok(Node::attach(alloc::vec![source], results, pivot))
    }
}

impl Operator for Pivot {
    fn kind(&self) -> &'static str {
        "pivot"
    }

    fn run(&mut self, results: &RecordSet) -> Result<()> {
        let schema = results.schema();
        let mut groups = Vec::new();
        for group in self.scanner.by_ref() {
            if group.is_empty() {
                continue;
            }
            let columns = (0..schema.len())
                .map(|field| {
                    Value::Tuple(group.iter().map(|record| record.values()[field].clone()).collect())
                })
                .collect();
            groups.push(alloc::vec![Record::new(schema.clone(), columns)?]);
        }
        if !groups.is_empty() {
            results.extend_record_groups(groups)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.scanner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn tuple(values: &[i64]) -> Value {
        Value::Tuple(values.iter().map(|v| Value::Int64(*v)).collect())
    }

    #[test]
    fn test_pivot_groups() {
        let rs = RecordSet::with_fields(["a", "b"]).unwrap();
        rs.append(vec![
            vec![Value::from(4), Value::from(3)],
            vec![Value::from(6), Value::from(5)],
            vec![Value::from(8), Value::from(7)],
        ])
        .unwrap();
        rs.append(Vec::<Vec<Value>>::new()).unwrap();
        rs.append(vec![
            vec![Value::from(10), Value::from(9)],
            vec![Value::from(12), Value::from(11)],
        ])
        .unwrap();

        let node = Pivot::build(&rs).unwrap();
        let results = node.results().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(
            results.get(0).unwrap().values(),
            &[tuple(&[4, 6, 8]), tuple(&[3, 5, 7])]
        );
        assert_eq!(
            results.get(1).unwrap().get_by_name("b"),
            Some(&tuple(&[9, 11]))
        );
    }
}
