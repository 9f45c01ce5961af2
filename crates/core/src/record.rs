//! Record structure for strata.
//!
//! A `Record` is an immutable, fixed-width tuple of values bound to a `RecordType`.
//! Cloning a record is cheap: the values are shared.

use crate::error::{Error, Result};
use crate::record_type::SchemaRef;
use crate::value::Value;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

/// An immutable record conforming to a record type.
#[derive(Clone)]
pub struct Record {
    schema: SchemaRef,
    values: Rc<[Value]>,
}

impl Record {
    /// Creates a record, checking the value count against the record type.
    pub fn new(schema: SchemaRef, values: Vec<Value>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(Error::arity(schema.len(), values.len()));
        }
        Ok(Self {
            schema,
            values: values.into(),
        })
    }

    /// Coerces a single value into a record.
    ///
    /// A single-field type wraps the value as-is. Wider types require a tuple of
    /// matching width.
    pub fn from_value(schema: SchemaRef, value: Value) -> Result<Self> {
        if schema.len() == 1 {
            return Self::new(schema, alloc::vec![value]);
        }
        match value {
            Value::Tuple(items) => Self::new(schema, items),
            _ => Err(Error::arity(schema.len(), 1)),
        }
    }

    /// Builds a record from name/value pairs; fields not mentioned are null.
    pub fn from_pairs<'a, I>(schema: SchemaRef, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut values = alloc::vec![Value::Null; schema.len()];
        for (name, value) in pairs {
            values[schema.resolve(name)?] = value;
        }
        Self::new(schema, values)
    }

    /// Returns the record type.
    #[inline]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Returns the values in field order.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; record types are never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at a position.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the value of a raw or sanitized field name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).and_then(|i| self.values.get(i))
    }

    /// Returns the value of a field, or `default` if the name does not resolve.
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.get_by_name(name).cloned().unwrap_or(default)
    }

    /// Returns `(field, value)` pairs in field order.
    pub fn as_pairs(&self) -> Vec<(&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.as_str())
            .zip(self.values.iter())
            .collect()
    }

    /// Returns a new record with some fields replaced.
    pub fn replace<'a, I>(&self, changes: I) -> Result<Record>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut values = self.values.to_vec();
        for (name, value) in changes {
            values[self.schema.resolve(name)?] = value;
        }
        Record::new(self.schema.clone(), values)
    }

    /// Rebinds the same values to another record type of equal width.
    pub fn with_schema(&self, schema: SchemaRef) -> Result<Record> {
        if schema.len() != self.len() {
            return Err(Error::arity(schema.len(), self.len()));
        }
        Ok(Record {
            schema,
            values: self.values.clone(),
        })
    }

    /// Converts the record into a tuple value.
    pub fn to_value(&self) -> Value {
        Value::Tuple(self.values.to_vec())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record{}", self)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (name, value)) in self.as_pairs().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_type::RecordType;
    use alloc::format;
    use alloc::vec;

    fn schema() -> SchemaRef {
        RecordType::shared(["a", "b"]).unwrap()
    }

    #[test]
    fn test_new_checks_width() {
        let r = Record::new(schema(), vec![Value::Int64(1), Value::Int64(2)]).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.get(1), Some(&Value::Int64(2)));
        assert_eq!(
            Record::new(schema(), vec![Value::Int64(1)]),
            Err(Error::arity(2, 1))
        );
    }

    #[test]
    fn test_from_value() {
        let single = RecordType::shared(["x"]).unwrap();
        let r = Record::from_value(single, Value::Int64(3)).unwrap();
        assert_eq!(r.values(), &[Value::Int64(3)]);

        let r = Record::from_value(
            schema(),
            Value::Tuple(vec![Value::Int64(1), Value::Int64(2)]),
        )
        .unwrap();
        assert_eq!(r.get_by_name("b"), Some(&Value::Int64(2)));
        assert!(Record::from_value(schema(), Value::Int64(1)).is_err());
    }

    #[test]
    fn test_from_pairs_fills_nulls() {
        let r = Record::from_pairs(schema(), [("b", Value::Int64(5))]).unwrap();
        assert_eq!(r.values(), &[Value::Null, Value::Int64(5)]);
        assert!(Record::from_pairs(schema(), [("c", Value::Null)]).is_err());
    }

    #[test]
    fn test_replace_creates_new_record() {
        let r = Record::new(schema(), vec![Value::Int64(1), Value::Int64(2)]).unwrap();
        let r2 = r.replace([("a", Value::Int64(9))]).unwrap();
        assert_eq!(r.get(0), Some(&Value::Int64(1)));
        assert_eq!(r2.get(0), Some(&Value::Int64(9)));
        assert_eq!(
            r.replace([("nope", Value::Null)]),
            Err(Error::column_not_found("nope"))
        );
    }

    #[test]
    fn test_get_or_and_pairs() {
        let r = Record::new(schema(), vec![Value::Int64(1), Value::Int64(2)]).unwrap();
        assert_eq!(r.get_or("zz", Value::Int64(0)), Value::Int64(0));
        assert_eq!(r.as_pairs(), vec![("a", &Value::Int64(1)), ("b", &Value::Int64(2))]);
        assert_eq!(format!("{}", r), "(a=1, b=2)");
    }

    #[test]
    fn test_equality_by_value() {
        let other = RecordType::shared(["x", "y"]).unwrap();
        let a = Record::new(schema(), vec![Value::Int64(1), Value::Int64(2)]).unwrap();
        let b = Record::new(other, vec![Value::Int64(1), Value::Int64(2)]).unwrap();
        assert_eq!(a, b);
    }
}
