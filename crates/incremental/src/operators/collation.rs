//! Key-ordered k-way merge of several sources.

use crate::dataflow::{Node, Operator, Source};
use alloc::collections::BinaryHeap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Reverse;
use hashbrown::HashSet;
use strata_core::{Error, Record, RecordType, Result, SchemaRef, Value};
use strata_storage::scan::RecordScanner;
use strata_storage::{RecordSet, Scan};

/// One collated source: its scanner and where its fields land in the output.
struct Input {
    scanner: RecordScanner,
    key: usize,
    collation: Option<usize>,
    /// `(output position, input position)` for each covered target field.
    coverage: Vec<(usize, usize)>,
}

/// Merges sources in key order into one stream of records.
///
/// Every output record carries the key, each target field and, when given, the
/// collation field. A source only updates the targets it covers; the rest keep
/// the value they had in the previous output record. With a collation field,
/// consecutive records sharing a non-null collation value collapse into one,
/// the later record winning.
pub struct Collation {
    schema: SchemaRef,
    collation: Option<usize>,
    inputs: Vec<Input>,
}

impl Collation {
    /// Wires a collation of `sources` ordered by `key`.
    ///
    /// With no `targets`, every non-key field of the sources is a target, in
    /// order of first appearance. Sources covering no target are ignored.
    pub fn build<I>(
        sources: I,
        key: &str,
        targets: Option<Vec<String>>,
        collation: Option<&str>,
    ) -> Result<Rc<Node<Collation>>>
    where
        I: IntoIterator,
        I::Item: Into<Source>,
    {
        let sources: Vec<Source> = sources.into_iter().map(Into::into).collect();
        let sets = sources
            .iter()
            .map(|source| source.require_records("collation source"))
            .collect::<Result<Vec<_>>>()?;

        let preset = targets.is_some();
        let mut targets = targets.unwrap_or_default();
        let mut covered = HashSet::new();
        if !preset {
            for rs in &sets {
                for field in rs.schema().fields() {
                    if field != key && Some(field.as_str()) != collation && covered.insert(field.clone()) {
                        targets.push(field.clone());
                    }
                }
            }
        }

        let mut fields = vec![String::from(key)];
        fields.extend(targets.iter().cloned());
        if let Some(collation) = collation {
            fields.push(String::from(collation));
        }
        let schema = RecordType::shared(fields)?;

        let mut inputs = Vec::new();
        let mut covered = HashSet::new();
        for rs in &sets {
            let input_schema = rs.schema();
            let coverage: Vec<(usize, usize)> = targets
                .iter()
                .enumerate()
                .filter_map(|(i, field)| input_schema.index_of(field).map(|at| (i + 1, at)))
                .collect();
            if coverage.is_empty() {
                continue;
            }
            covered.extend(coverage.iter().map(|(out, _)| *out));
            inputs.push(Input {
                scanner: RecordScanner::new(rs),
                key: input_schema.resolve(key)?,
                collation: collation.map(|field| input_schema.resolve(field)).transpose()?,
                coverage,
            });
        }
        if let Some(missing) = (1..=targets.len()).find(|out| !covered.contains(out)) {
            return Err(Error::column_not_found(targets[missing - 1].clone()));
        }

        let results = RecordSet::new(schema.clone());
        let collation = Collation {
            collation: collation.map(|_| schema.len() - 1),
            schema,
            inputs,
        };
        Ok(Node::attach(sources, results, collation))
    }

    fn pull(&mut self, input: usize) -> Option<(Value, Record)> {
        let entry = &mut self.inputs[input];
        let record = entry.scanner.next()?;
        let key = record.get(entry.key).cloned().unwrap_or(Value::Null);
        Some((key, record))
    }
}

impl Operator for Collation {
    fn kind(&self) -> &'static str {
        "collation"
    }

    fn run(&mut self, results: &RecordSet) -> Result<()> {
        let previous = results.last_record();
        let mut cursor: Vec<Value> = match &previous {
            Some(record) => record.values().to_vec(),
            None => vec![Value::Null; self.schema.len()],
        };

        let mut heads: Vec<Option<Record>> = vec![None; self.inputs.len()];
        let mut heap = BinaryHeap::new();
        for input in 0..self.inputs.len() {
            if let Some((key, record)) = self.pull(input) {
                heads[input] = Some(record);
                heap.push(Reverse((key, input)));
            }
        }

        let mut merged: Vec<Record> = Vec::new();
        let mut replaces_stored = false;
        while let Some(Reverse((key, input))) = heap.pop() {
            let Some(record) = heads[input].take() else {
                continue;
            };
            let source = &self.inputs[input];
            for (out, at) in &source.coverage {
                cursor[*out] = record.values()[*at].clone();
            }
            cursor[0] = key;

            let mut collapse = false;
            if let (Some(out), Some(at)) = (self.collation, source.collation) {
                let value = record.values()[at].clone();
                collapse = value != Value::Null && cursor[out] == value;
                cursor[out] = value;
            }

            let next = Record::new(self.schema.clone(), cursor.clone())?;
            match merged.last_mut() {
                Some(last) if collapse => *last = next,
                None if collapse && previous.is_some() => {
                    tracing::debug!("collation replacing stored record");
                    replaces_stored = true;
                    merged.push(next);
                }
                _ => merged.push(next),
            }

            if let Some((key, record)) = self.pull(input) {
                heads[input] = Some(record);
                heap.push(Reverse((key, input)));
            }
        }

        if merged.is_empty() {
            return Ok(());
        }
        if replaces_stored {
            let replacement = merged.remove(0);
            results.amend_last_group(|group| {
                if let Some(last) = group.last_mut() {
                    *last = replacement;
                }
            })?;
        }
        if !merged.is_empty() {
            results.append_records(merged)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        for input in self.inputs.iter_mut() {
            input.scanner.reset();
        }
    }
}
