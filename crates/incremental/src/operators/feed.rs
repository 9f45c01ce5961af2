//! Union of many sources under one renamed record type.

use crate::dataflow::{Node, Operator, Source};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use strata_core::{Error, Record, RecordType, Result, SchemaRef, Value};
use strata_storage::scan::RecordScanner;
use strata_storage::{RecordSet, Scan};

/// Where a fed record's key values come from.
enum KeySource {
    /// The same values for every record of the source.
    Fixed(Vec<Value>),
    /// Positions of the key fields within the source record.
    Fields(Vec<usize>),
}

struct Feeder {
    source: RecordSet,
    scanner: RecordScanner,
    key: KeySource,
}

/// Appends every record of every source, renamed to one record type and
/// tagged with key values.
///
/// Output fields are the renamed fields followed by the key fields. Each apply
/// emits one group per source that had new records.
pub struct Feed {
    schema: SchemaRef,
    width: usize,
    key_fields: Vec<String>,
    feeders: Vec<Feeder>,
}

impl Feed {
    /// Creates a feed over `sources`, each paired with optional fixed key
    /// values. More sources can be added later with `add_source`.
    pub fn build<I, F, S, K, T>(sources: I, renamed_fields: F, key_fields: K) -> Result<Rc<Node<Feed>>>
    where
        I: IntoIterator<Item = (Source, Option<Vec<Value>>)>,
        F: IntoIterator<Item = S>,
        S: Into<String>,
        K: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut fields: Vec<String> = renamed_fields.into_iter().map(Into::into).collect();
        let width = fields.len();
        let key_fields: Vec<String> = key_fields.into_iter().map(Into::into).collect();
        fields.extend(key_fields.iter().cloned());
        let schema = RecordType::shared(fields)?;
        let results = RecordSet::new(schema.clone());
        let feed = Feed {
            schema,
            width,
            key_fields,
            feeders: Vec::new(),
        };
        let node = Node::attach(Vec::new(), results, feed);
        for (source, key) in sources {
            node.add_source(source, key)?;
        }
        Ok(node)
    }

    fn feeder(&self, source: RecordSet, key: Option<Vec<Value>>) -> Result<Feeder> {
        let input = source.schema().clone();
        if input.len() != self.width {
            return Err(Error::arity(self.width, input.len()));
        }
        let key = match key {
            Some(values) => {
                if values.len() != self.key_fields.len() {
                    return Err(Error::arity(self.key_fields.len(), values.len()));
                }
                KeySource::Fixed(values)
            }
            None => KeySource::Fields(
                self.key_fields
                    .iter()
                    .map(|field| input.resolve(field))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(Feeder {
            scanner: RecordScanner::new(&source),
            source,
            key,
        })
    }
}

impl Node<Feed> {
    /// Adds a source whose records are fed from its first unread group on.
    ///
    /// With `key`, every record is tagged with those values; without, the key
    /// values are read from the source's own fields of the same names.
    pub fn add_source(self: &Rc<Self>, source: impl Into<Source>, key: Option<Vec<Value>>) -> Result<()> {
        let source = source.into();
        let records = source.require_records("feed source")?;
        let feeder = self.with_operator(|feed| feed.feeder(records, key))??;
        self.with_operator(|feed| feed.feeders.push(feeder))?;
        self.connect(source);
        Ok(())
    }

    /// Stops feeding from `source`. Records already fed stay in the results.
    pub fn remove_source(&self, source: impl Into<Source>) -> Result<()> {
        let source = source.into();
        let records = source.require_records("feed source")?;
        let removed = self.with_operator(|feed| {
            let before = feed.feeders.len();
            feed.feeders.retain(|feeder| !feeder.source.ptr_eq(&records));
            before - feed.feeders.len()
        })?;
        if removed == 0 {
            return Err(Error::invalid_operation(format!(
                "record set {} is not fed",
                records.id()
            )));
        }
        self.disconnect(&source);
        Ok(())
    }
}

impl Operator for Feed {
    fn kind(&self) -> &'static str {
        "feed"
    }

    fn run(&mut self, results: &RecordSet) -> Result<()> {
        let mut groups = Vec::new();
        for feeder in self.feeders.iter_mut() {
            let mut group = Vec::new();
            for record in feeder.scanner.by_ref() {
                let mut values = record.values().to_vec();
                match &feeder.key {
                    KeySource::Fixed(keys) => values.extend(keys.iter().cloned()),
                    KeySource::Fields(positions) => {
                        values.extend(positions.iter().map(|at| record.values()[*at].clone()))
                    }
                }
                group.push(Record::new(self.schema.clone(), values)?);
            }
            if !group.is_empty() {
                groups.push(group);
            }
        }
        if !groups.is_empty() {
            results.extend_record_groups(groups)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        for feeder in self.feeders.iter_mut() {
            feeder.scanner.reset();
        }
    }
}
