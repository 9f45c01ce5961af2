//! Cursor-based scanners over record sets.
//!
//! A scanner is a forward cursor `(group, record)` over one `RecordSet` plus a
//! getter deciding what each step yields:
//!
//! - `ElementScanner`: one field value per record
//! - `ChunkScanner`: one field's values per group
//! - `RecordScanner`: whole records
//! - `GroupScanner`: whole groups
//! - `ConstantScanner`: the same value on every step, without a record set
//!
//! Scanners hold their record set weakly and read it step by step, so a caller
//! that stops early leaves the cursor exactly after the last item it took. The
//! cursor is kept normalized: after the last record of a group it points at the
//! start of the next group, so an abandoned pass resumes mid-group from the first
//! unread record and a finished group is never re-read.
//!
//! `Replaying` overlays an anchor on any scanner; `ZipScan` and `debounce` drive
//! several scanners in lock-step and realign them afterwards.

/// Implements `Scan` for a scanner wrapping a `Cursor` in a field named `cursor`.
macro_rules! cursor_scan {
    ($scanner:ty, $rewind:ident) => {
        impl $crate::scan::Scan for $scanner {
            fn reset(&mut self) {
                self.cursor.reset();
            }

            fn rewind(&mut self, steps: usize) {
                self.cursor.$rewind(steps);
            }

            fn is_exhausted(&self) -> bool {
                self.cursor.is_exhausted()
            }

            fn position(&self) -> $crate::scan::Position {
                self.cursor.position()
            }

            fn seek(&mut self, position: $crate::scan::Position) {
                self.cursor.seek(position);
            }

            fn is_overdrawn(&self) -> bool {
                self.cursor.overdrawn
            }

            fn set_overdrawn(&mut self, overdrawn: bool) {
                self.cursor.overdrawn = overdrawn;
            }
        }
    };
}

mod chunk;
mod constant;
mod cursor;
mod element;
mod group;
mod record;
mod replaying;
mod zip;

pub use chunk::ChunkScanner;
pub use constant::ConstantScanner;
pub use element::ElementScanner;
pub use group::GroupScanner;
pub use record::RecordScanner;
pub use replaying::{
    Replaying, ReplayingChunkScanner, ReplayingElementScanner, ReplayingGroupScanner,
    ReplayingRecordScanner,
};
pub use zip::{debounce, ZipScan};

use strata_core::Value;

/// A cursor position: the next group to read and the next record within it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub group: usize,
    pub record: usize,
}

impl Position {
    /// Creates a position.
    pub const fn new(group: usize, record: usize) -> Self {
        Self { group, record }
    }
}

/// Cursor control shared by every scanner.
pub trait Scan {
    /// Returns to the start of the source.
    fn reset(&mut self);

    /// Moves back one item per step (a record, or a group for group-granularity
    /// scanners), stopping at the start.
    fn rewind(&mut self, steps: usize);

    /// True once every group has been consumed.
    fn is_exhausted(&self) -> bool;

    /// Returns the live cursor.
    fn position(&self) -> Position;

    /// Moves the live cursor.
    fn seek(&mut self, position: Position);

    /// True if a lock-step read consumed an item this scanner must give back.
    fn is_overdrawn(&self) -> bool;

    /// Sets or clears the overdrawn mark.
    fn set_overdrawn(&mut self, overdrawn: bool);
}

/// A scanner that yields one `Value` per step.
///
/// Calculations drive their inputs through this trait: element scanners yield the
/// field value, chunk scanners yield a tuple per group.
pub trait ValueScan: Scan {
    /// Advances and returns the next value.
    fn next_value(&mut self) -> Option<Value>;

    /// False for scanners that never run out, such as constants.
    fn is_bounded(&self) -> bool {
        true
    }
}
