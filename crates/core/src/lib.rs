//! Strata Core - values, record types and records for the strata dataflow engine.
//!
//! This crate provides the foundational types shared by every other strata crate:
//!
//! - `Value`: Runtime values held in record fields and produced by formulas
//! - `RecordType`: Immutable field-name schema with sanitized aliases
//! - `Record`: An immutable tuple of values bound to a record type
//! - `Error`: Error types for storage, graph wiring and formula evaluation
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Record, RecordType, Value};
//!
//! let schema = RecordType::shared(["price", "unit count"]).unwrap();
//! let record = Record::new(schema, vec![Value::Int64(4), Value::Int64(2)]).unwrap();
//!
//! assert_eq!(record.get_by_name("unit_count"), Some(&Value::Int64(2)));
//! assert_eq!(record.get(0).unwrap().try_mul(record.get(1).unwrap()).unwrap(), Value::Int64(8));
//! ```

#![no_std]

extern crate alloc;

mod arith;
mod error;
mod record;
pub mod record_type;
mod value;

pub use error::{Error, Result};
pub use record::Record;
pub use record_type::{RecordType, SchemaRef};
pub use value::Value;
