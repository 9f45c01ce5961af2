//! Strata Storage - grouped record sets and scanners.
//!
//! This crate provides the data layer of the strata dataflow engine:
//!
//! - `RecordSet`: append-only, grouped, observable list of records
//! - `ColumnView`: lazy per-group projection of one field
//! - `TabularSource`: ingestion of column-oriented tables
//! - `scan`: forward cursors over record sets, anchored replay and lock-step
//!   reading with `debounce`
//!
//! # Example
//!
//! ```rust
//! use strata_core::Value;
//! use strata_storage::scan::ElementScanner;
//! use strata_storage::RecordSet;
//!
//! let rs = RecordSet::with_fields(["price"]).unwrap();
//! rs.append(vec![vec![Value::from(10)], vec![Value::from(12)]]).unwrap();
//!
//! let mut prices = ElementScanner::new(&rs, "price").unwrap();
//! assert_eq!(prices.next(), Some(Value::from(10)));
//!
//! // later appends are picked up where the scanner stopped
//! rs.append(vec![vec![Value::from(11)]]).unwrap();
//! let rest: Vec<_> = prices.collect();
//! assert_eq!(rest, vec![Value::from(12), Value::from(11)]);
//! ```

#![no_std]

extern crate alloc;

pub mod column;
pub mod ingest;
pub mod record_set;
pub mod render;
pub mod scan;

pub use column::ColumnView;
pub use ingest::TabularSource;
pub use record_set::{RecordGroup, RecordSet, Records, WeakRecordSet};
pub use render::{RenderOptions, Rendered};
pub use scan::{Position, Scan, ValueScan};
