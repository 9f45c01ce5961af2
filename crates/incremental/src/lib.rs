//! Strata Incremental - the lazy dependency graph of derived record sets.
//!
//! A derived node reads its sources through scanners, so each apply only
//! consumes what arrived since the last one. Nodes are applied on demand: a
//! source change marks dependents dirty and the work happens when results are
//! read.
//!
//! # Core Concepts
//!
//! - `Node<O>`: result set, dirty flag and sources around an `Operator`
//! - `DerivedNode`: object-safe view used to chain nodes of any operator type
//! - `Source`: a record set, another node, or a named constant
//! - `Formula`: native closure or compiled expression with named parameters
//!
//! # Example
//!
//! ```rust
//! use strata_core::Value;
//! use strata_incremental::{aggregate, Formula, Source};
//! use strata_storage::RecordSet;
//!
//! let rs = RecordSet::with_fields(["a", "b"]).unwrap();
//! rs.append(vec![
//!     vec![Value::Int64(1), Value::Int64(0)],
//!     vec![Value::Int64(2), Value::Int64(1)],
//! ]).unwrap();
//!
//! let total = aggregate(
//!     vec![Source::from(&rs)],
//!     Formula::parse("sum(a) - sum(b)").unwrap(),
//!     ["total"],
//! ).unwrap();
//! assert!(total.result_set().is_empty());
//! assert_eq!(total.records().unwrap()[0].get(0), Some(&Value::Int64(2)));
//!
//! rs.append(vec![vec![Value::Int64(7), Value::Int64(0)]]).unwrap();
//! assert!(total.is_dirty());
//! assert_eq!(total.records().unwrap()[0].get(0), Some(&Value::Int64(9)));
//! ```

#![no_std]

extern crate alloc;

pub mod dataflow;
mod formula;
pub mod operators;

pub use dataflow::{resolve, DerivedNode, Node, Operator, Source};
pub use formula::{Formula, NativeFn};
pub use operators::{
    aggregate, cluster, sweep, window, Calculation, CalculationBuilder, CalculationKind, Cluster,
    Collation, Feed, LagBucket, Merge, Pivot, Regroup,
};
