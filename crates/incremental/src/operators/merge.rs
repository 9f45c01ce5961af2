//! Column-wise union of several sources.

use crate::dataflow::{resolve, Node, Operator, Source};
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashSet;
use strata_core::{Error, Record, RecordType, Result, SchemaRef};
use strata_storage::scan::{debounce, ZipScan};
use strata_storage::{RecordSet, ValueScan};

/// Reads every field of every source side by side.
///
/// Fields keep the order in which they first appear across the sources, but a
/// field present in several sources is read from the last of them.
pub struct Merge {
    schema: SchemaRef,
    scanners: Vec<Box<dyn ValueScan>>,
}

impl Merge {
    /// Wires a merge of `sources`.
    pub fn build<I>(sources: I) -> Result<Rc<Node<Merge>>>
    where
        I: IntoIterator,
        I::Item: Into<Source>,
    {
        let sources: Vec<Source> = sources.into_iter().map(Into::into).collect();

        let mut seen = HashSet::new();
        let mut fields: Vec<String> = Vec::new();
        for source in &sources {
            match source {
                Source::Constant { name, .. } => {
                    if seen.insert(name.clone()) {
                        fields.push(name.clone());
                    }
                }
                other => {
                    let schema = other
                        .schema()
                        .ok_or_else(|| Error::invalid_operation("merge source has no record type"))?;
                    for field in schema.fields() {
                        if seen.insert(field.clone()) {
                            fields.push(field.clone());
                        }
                    }
                }
            }
        }

        let scanners = fields
            .iter()
            .map(|field| resolve(&sources, field)?.element_scanner(field))
            .collect::<Result<Vec<_>>>()?;
        if !scanners.iter().any(|s| s.is_bounded()) {
            return Err(Error::invalid_operation("merge needs a record source"));
        }

        let schema = RecordType::shared(fields)?;
        let results = RecordSet::new(schema.clone());
        Ok(Node::attach(sources, results, Merge { schema, scanners }))
    }
}

impl Operator for Merge {
    fn kind(&self) -> &'static str {
        "merge"
    }

    fn run(&mut self, results: &RecordSet) -> Result<()> {
        let records = ZipScan::new(&mut self.scanners)
            .map(|row| Record::new(self.schema.clone(), row))
            .collect::<Result<Vec<_>>>()?;
        if !records.is_empty() {
            results.append_records(records)?;
        }
        Ok(())
    }

    fn debounce(&mut self) {
        debounce(self.scanners.iter_mut().map(|s| s.as_mut()));
    }

    fn reset(&mut self) {
        for scanner in self.scanners.iter_mut() {
            scanner.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use strata_core::Value;

    #[test]
    fn test_merge_field_order_and_shadowing() {
        let left = RecordSet::with_fields(["a", "b"]).unwrap();
        left.append(vec![
            vec![Value::from(1), Value::from("left")],
            vec![Value::from(2), Value::from("left")],
        ])
        .unwrap();
        let right = RecordSet::with_fields(["b", "c"]).unwrap();
        right
            .append(vec![vec![Value::from("right"), Value::from(true)]])
            .unwrap();

        let node = Merge::build([&left, &right]).unwrap();
        let results = node.results().unwrap();
        assert_eq!(results.schema().fields(), &["a", "b", "c"]);
        assert_eq!(results.record_count(), 1);
        assert_eq!(
            results.get(0).unwrap().values(),
            &[Value::from(1), Value::from("right"), Value::from(true)]
        );

        right
            .append(vec![vec![Value::from("again"), Value::from(false)]])
            .unwrap();
        let results = node.results().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.get(-1).unwrap().get(0), Some(&Value::from(2)));
    }

    #[test]
    fn test_merge_with_constant() {
        let rs = RecordSet::with_fields(["a"]).unwrap();
        rs.append(vec![vec![Value::from(1)], vec![Value::from(2)]])
            .unwrap();
        let node = Merge::build([Source::from(&rs), Source::constant("tag", "x")]).unwrap();
        let records = node.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get_by_name("tag"), Some(&Value::from("x")));
    }
}
