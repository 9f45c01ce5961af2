//! Calculations: formulas applied over scanners to produce new values.

use crate::dataflow::{resolve, Node, Operator, Source};
use crate::formula::Formula;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use strata_core::{Error, Record, RecordType, Result, SchemaRef, Value};
use strata_storage::scan::{debounce, Position, ZipScan};
use strata_storage::{RecordSet, ValueScan};

/// How a calculation walks its inputs and groups its outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CalculationKind {
    /// Row-wise: one call per record, one flat output group per apply.
    Sweep,
    /// Row-wise within groups: one output group per input group.
    Cluster,
    /// One call over whole columns; the result replaces everything.
    Aggregate,
    /// One call per input group, one flat output group per apply.
    Window,
}

impl CalculationKind {
    /// Returns the lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            CalculationKind::Sweep => "sweep",
            CalculationKind::Cluster => "cluster",
            CalculationKind::Aggregate => "aggregate",
            CalculationKind::Window => "window",
        }
    }

    fn reads_chunks(&self) -> bool {
        matches!(self, CalculationKind::Cluster | CalculationKind::Window)
    }
}

/// A formula bound to input scanners.
pub struct Calculation {
    kind: CalculationKind,
    formula: Formula,
    schema: SchemaRef,
    scanners: Vec<Box<dyn ValueScan>>,
}

impl Calculation {
    /// Starts building a calculation of the given kind.
    pub fn builder(kind: CalculationKind) -> CalculationBuilder {
        CalculationBuilder::new(kind)
    }

    /// Returns the calculation kind.
    #[inline]
    pub fn calculation_kind(&self) -> CalculationKind {
        self.kind
    }

    /// Returns the formula.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    fn to_record(&self, value: Value) -> Result<Record> {
        Record::from_value(self.schema.clone(), value)
    }

    fn sweep(&mut self, results: &RecordSet) -> Result<()> {
        let rows: Vec<Vec<Value>> = ZipScan::new(&mut self.scanners).collect();
        let records = rows
            .iter()
            .map(|row| self.formula.call(row).and_then(|v| self.to_record(v)))
            .collect::<Result<Vec<_>>>()?;
        if !records.is_empty() {
            results.append_records(records)?;
        }
        Ok(())
    }

    fn cluster(&mut self, results: &RecordSet) -> Result<()> {
        let bounded: Vec<bool> = self.scanners.iter().map(|s| s.is_bounded()).collect();
        let chunks: Vec<Vec<Value>> = ZipScan::new(&mut self.scanners).collect();
        let mut groups = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let width = chunk
                .iter()
                .zip(&bounded)
                .filter(|(_, bounded)| **bounded)
                .map(|(value, _)| value.as_tuple().map_or(0, <[Value]>::len))
                .min()
                .unwrap_or(0);
            let mut group = Vec::with_capacity(width);
            for row in 0..width {
                let arguments: Vec<Value> = chunk
                    .iter()
                    .zip(&bounded)
                    .map(|(value, bounded)| match (bounded, value.as_tuple()) {
                        (true, Some(items)) => items[row].clone(),
                        _ => value.clone(),
                    })
                    .collect();
                group.push(self.to_record(self.formula.call(&arguments)?)?);
            }
            groups.push(group);
        }
        if !groups.is_empty() {
            results.extend_record_groups(groups)?;
        }
        Ok(())
    }

    fn aggregate(&mut self, results: &RecordSet) -> Result<()> {
        let mut arguments = Vec::with_capacity(self.scanners.len());
        for scanner in self.scanners.iter_mut() {
            scanner.reset();
            if scanner.is_bounded() {
                let mut column = Vec::new();
                while let Some(value) = scanner.next_value() {
                    column.push(value);
                }
                arguments.push(Value::Tuple(column));
            } else {
                arguments.push(scanner.next_value().unwrap_or(Value::Null));
            }
        }
        let record = self.to_record(self.formula.call(&arguments)?)?;
        results.clear();
        results.append_record(record)
    }

    fn window(&mut self, results: &RecordSet) -> Result<()> {
        let chunks: Vec<Vec<Value>> = ZipScan::new(&mut self.scanners).collect();
        let records = chunks
            .iter()
            .map(|chunk| self.formula.call(chunk).and_then(|v| self.to_record(v)))
            .collect::<Result<Vec<_>>>()?;
        if !records.is_empty() {
            results.append_records(records)?;
        }
        Ok(())
    }
}

impl Operator for Calculation {
    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    /// Runs the formula over unread input. On failure every scanner returns to
    /// where it started, so the same input is read again on retry.
    fn run(&mut self, results: &RecordSet) -> Result<()> {
        let saved: Vec<Position> = self.scanners.iter().map(|s| s.position()).collect();
        let outcome = match self.kind {
            CalculationKind::Sweep => self.sweep(results),
            CalculationKind::Cluster => self.cluster(results),
            CalculationKind::Aggregate => self.aggregate(results),
            CalculationKind::Window => self.window(results),
        };
        if outcome.is_err() {
            for (scanner, position) in self.scanners.iter_mut().zip(saved) {
                scanner.seek(position);
                scanner.set_overdrawn(false);
            }
        }
        outcome
    }

    fn debounce(&mut self) {
        if self.kind != CalculationKind::Aggregate {
            debounce(self.scanners.iter_mut().map(|s| s.as_mut()));
        }
    }

    fn reset(&mut self) {
        for scanner in self.scanners.iter_mut() {
            scanner.reset();
        }
    }
}

/// Builder for calculation nodes.
///
/// # Example
///
/// ```rust
/// use strata_core::Value;
/// use strata_incremental::{Calculation, CalculationKind, Formula};
/// use strata_storage::RecordSet;
///
/// let rs = RecordSet::with_fields(["price", "qty"]).unwrap();
/// rs.append(vec![vec![Value::Int64(3), Value::Int64(2)]]).unwrap();
///
/// let node = Calculation::builder(CalculationKind::Sweep)
///     .source(&rs)
///     .formula(Formula::parse("price * qty").unwrap())
///     .outputs(["total"])
///     .build()
///     .unwrap();
///
/// let results = node.results().unwrap();
/// assert_eq!(results.get(0).unwrap().get_by_name("total"), Some(&Value::Int64(6)));
/// ```
pub struct CalculationBuilder {
    kind: CalculationKind,
    sources: Vec<Source>,
    formula: Option<Formula>,
    outputs: Vec<String>,
    inputs: HashMap<String, String>,
}

impl CalculationBuilder {
    /// Creates a builder.
    pub fn new(kind: CalculationKind) -> Self {
        Self {
            kind,
            sources: Vec::new(),
            formula: None,
            outputs: Vec::new(),
            inputs: HashMap::new(),
        }
    }

    /// Adds one source; later sources shadow earlier ones.
    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Adds several sources in order.
    pub fn sources<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Source>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self
    }

    /// Sets the formula.
    pub fn formula(mut self, formula: Formula) -> Self {
        self.formula = Some(formula);
        self
    }

    /// Sets the output field names.
    pub fn outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    /// Feeds `parameter` from `column` instead of the column of the same name.
    pub fn map_input(mut self, parameter: impl Into<String>, column: impl Into<String>) -> Self {
        self.inputs.insert(parameter.into(), column.into());
        self
    }

    /// Resolves every parameter to a column and wires the node.
    ///
    /// Fails with `ColumnNotFound` if a column is missing from every source, and
    /// with `InvalidOperation` if no input is read from a record set.
    pub fn build(self) -> Result<Rc<Node<Calculation>>> {
        let formula = self
            .formula
            .ok_or_else(|| Error::invalid_operation("calculation has no formula"))?;
        let schema = RecordType::shared(self.outputs)?;

        let mut scanners = Vec::with_capacity(formula.parameters().len());
        for parameter in formula.parameters() {
            let column = self
                .inputs
                .get(parameter)
                .map(String::as_str)
                .unwrap_or(parameter);
            let source = resolve(&self.sources, column)?;
            scanners.push(if self.kind.reads_chunks() {
                source.chunk_scanner(column)?
            } else {
                source.element_scanner(column)?
            });
        }
        if !scanners.iter().any(|s| s.is_bounded()) {
            return Err(Error::invalid_operation(alloc::format!(
                "{} needs at least one input read from a record set",
                self.kind.name()
            )));
        }

        let results = RecordSet::new(schema.clone());
        let calculation = Calculation {
            kind: self.kind,
            formula,
            schema,
            scanners,
        };
        Ok(Node::attach(self.sources, results, calculation))
    }
}

fn shorthand<I, S>(
    kind: CalculationKind,
    sources: Vec<Source>,
    formula: Formula,
    outputs: I,
) -> Result<Rc<Node<Calculation>>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CalculationBuilder::new(kind)
        .sources(sources)
        .formula(formula)
        .outputs(outputs)
        .build()
}

/// Builds a row-wise calculation.
pub fn sweep<I, S>(sources: Vec<Source>, formula: Formula, outputs: I) -> Result<Rc<Node<Calculation>>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    shorthand(CalculationKind::Sweep, sources, formula, outputs)
}

/// Builds a group-preserving row-wise calculation.
pub fn cluster<I, S>(sources: Vec<Source>, formula: Formula, outputs: I) -> Result<Rc<Node<Calculation>>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    shorthand(CalculationKind::Cluster, sources, formula, outputs)
}

/// Builds a whole-set reduction.
pub fn aggregate<I, S>(sources: Vec<Source>, formula: Formula, outputs: I) -> Result<Rc<Node<Calculation>>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    shorthand(CalculationKind::Aggregate, sources, formula, outputs)
}

/// Builds a per-group calculation.
pub fn window<I, S>(sources: Vec<Source>, formula: Formula, outputs: I) -> Result<Rc<Node<Calculation>>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    shorthand(CalculationKind::Window, sources, formula, outputs)
}
