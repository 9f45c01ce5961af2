//! Change descriptors carried by notifications.
//!
//! A `Change` names the affected group range before and after a mutation. The
//! selectors are advisory: a listener decides for itself how much to recompute.
//! Only the full-range pair (a clear) obliges dependents to re-derive everything.

use crate::notify::NodeId;
use core::fmt;

/// A range of groups touched by a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Selector {
    /// No particular range; used as the "old" side of pure growth.
    #[default]
    Unspecified,
    /// Half-open group range with optional, possibly negative bounds.
    Range {
        start: Option<isize>,
        stop: Option<isize>,
    },
}

impl Selector {
    /// Every group.
    pub const ALL: Selector = Selector::Range {
        start: None,
        stop: None,
    };

    /// The trailing `count` groups.
    pub fn tail(count: usize) -> Self {
        Selector::Range {
            start: Some(-(count as isize)),
            stop: None,
        }
    }

    /// Returns true for the unbounded range.
    #[inline]
    pub fn is_all(&self) -> bool {
        *self == Selector::ALL
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Unspecified => write!(f, "-"),
            Selector::Range { start, stop } => {
                if let Some(start) = start {
                    write!(f, "{}", start)?;
                }
                write!(f, ":")?;
                if let Some(stop) = stop {
                    write!(f, "{}", stop)?;
                }
                Ok(())
            }
        }
    }
}

/// A notification pushed from a producer to its listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Change {
    /// Range affected before the mutation.
    pub old: Selector,
    /// Range affected after the mutation.
    pub new: Selector,
    /// The producer that mutated.
    pub origin: NodeId,
    /// Number of hops from the origin.
    pub depth: usize,
}

impl Change {
    /// `count` groups were appended.
    pub fn appended(origin: NodeId, count: usize) -> Self {
        Self {
            old: Selector::Unspecified,
            new: Selector::tail(count),
            origin,
            depth: 0,
        }
    }

    /// The trailing group was replaced by a longer or edited one.
    pub fn amended(origin: NodeId) -> Self {
        Self {
            old: Selector::tail(1),
            new: Selector::tail(1),
            origin,
            depth: 0,
        }
    }

    /// Every group was removed.
    pub fn cleared(origin: NodeId) -> Self {
        Self {
            old: Selector::ALL,
            new: Selector::ALL,
            origin,
            depth: 0,
        }
    }

    /// Returns true when dependents must discard all derived state.
    #[inline]
    pub fn is_reset(&self) -> bool {
        self.old.is_all() && self.new.is_all()
    }

    /// Returns true when the trailing group was rewritten in place.
    ///
    /// Scanners that already passed the trailing group cannot see the edit, so
    /// dependents treat an amendment like a reset.
    #[inline]
    pub fn is_amendment(&self) -> bool {
        self.old == Selector::tail(1) && self.new == Selector::tail(1)
    }

    /// The same change, one hop further downstream.
    pub fn forwarded(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_constructors() {
        let c = Change::appended(7, 2);
        assert_eq!(c.old, Selector::Unspecified);
        assert_eq!(c.new, Selector::tail(2));
        assert!(!c.is_reset());

        assert!(Change::cleared(7).is_reset());
        assert!(!Change::amended(7).is_reset());
        assert!(Change::amended(7).is_amendment());
        assert!(!Change::appended(7, 1).is_amendment());
    }

    #[test]
    fn test_forwarded_increments_depth() {
        let c = Change::cleared(3).forwarded().forwarded();
        assert_eq!(c.depth, 2);
        assert_eq!(c.origin, 3);
        assert!(c.is_reset());
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(format!("{}", Selector::ALL), ":");
        assert_eq!(format!("{}", Selector::tail(1)), "-1:");
        assert_eq!(format!("{}", Selector::Unspecified), "-");
    }
}
