//! Operators that derive one record set from others.
//!
//! Calculations compute new values with a `Formula`:
//! - `Calculation` in its four `CalculationKind`s (sweep, cluster, aggregate, window)
//!
//! Transforms restructure existing records without computing new values:
//! - `Merge`: side-by-side union of fields
//! - `Cluster`: runs of equal key
//! - `Regroup`: one stream cut along another's group boundaries
//! - `Collation`: key-ordered k-way merge
//! - `Pivot`: groups rotated into tuple-valued records
//! - `LagBucket`: records paired with an earlier record
//! - `Feed`: many sources renamed into one

mod calculation;
mod cluster;
mod collation;
mod feed;
mod lag_bucket;
mod merge;
mod pivot;
mod regroup;

pub use calculation::{
    aggregate, cluster, sweep, window, Calculation, CalculationBuilder, CalculationKind,
};
pub use cluster::Cluster;
pub use collation::Collation;
pub use feed::Feed;
pub use lag_bucket::LagBucket;
pub use merge::Merge;
pub use pivot::Pivot;
pub use regroup::Regroup;
