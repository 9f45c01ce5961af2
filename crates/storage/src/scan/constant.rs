//! Constant input scanning.

use super::{Position, Scan, ValueScan};
use strata_core::Value;

/// Yields the same value on every step and never runs out.
///
/// Used for named constants bound as calculation inputs. Lock-step reads stop on
/// the bounded scanners they are zipped with.
#[derive(Clone, Debug)]
pub struct ConstantScanner {
    value: Value,
    emitted: usize,
    overdrawn: bool,
}

impl ConstantScanner {
    /// Creates a scanner repeating `value`.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            emitted: 0,
            overdrawn: false,
        }
    }

    /// Returns the repeated value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Iterator for ConstantScanner {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.emitted = self.emitted.saturating_add(1);
        Some(self.value.clone())
    }
}

impl Scan for ConstantScanner {
    fn reset(&mut self) {
        self.emitted = 0;
        self.overdrawn = false;
    }

    fn rewind(&mut self, steps: usize) {
        self.emitted = self.emitted.saturating_sub(steps);
    }

    fn is_exhausted(&self) -> bool {
        false
    }

    fn position(&self) -> Position {
        Position::new(0, self.emitted)
    }

    fn seek(&mut self, position: Position) {
        self.emitted = position.record;
    }

    fn is_overdrawn(&self) -> bool {
        self.overdrawn
    }

    fn set_overdrawn(&mut self, overdrawn: bool) {
        self.overdrawn = overdrawn;
    }
}

impl ValueScan for ConstantScanner {
    fn next_value(&mut self) -> Option<Value> {
        self.next()
    }

    fn is_bounded(&self) -> bool {
        false
    }
}
