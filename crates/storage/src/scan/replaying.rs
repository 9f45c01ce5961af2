//! Anchored scanners that can re-read from a saved position.

use super::{ChunkScanner, ElementScanner, GroupScanner, Position, RecordScanner, Scan};

/// A scanner with an anchor it can return to.
///
/// Iterating `&mut Replaying<S>` always starts from the anchor, so every pass
/// re-reads the same data until `anchor` moves the starting point forward. `live`
/// continues from wherever the previous read stopped.
///
/// ```ignore
/// let mut scanner = Replaying::new(ElementScanner::new(&rs, "a")?);
/// for value in &mut scanner {
///     if done(&value) {
///         break;
///     }
/// }
/// scanner.anchor(); // later passes start after `value`
/// ```
pub struct Replaying<S> {
    inner: S,
    anchor: Position,
}

/// Element scanner with an anchor.
pub type ReplayingElementScanner = Replaying<ElementScanner>;
/// Chunk scanner with an anchor.
pub type ReplayingChunkScanner = Replaying<ChunkScanner>;
/// Record scanner with an anchor.
pub type ReplayingRecordScanner = Replaying<RecordScanner>;
/// Group scanner with an anchor.
pub type ReplayingGroupScanner = Replaying<GroupScanner>;

impl<S: Scan> Replaying<S> {
    /// Wraps a scanner, anchoring at its current position.
    pub fn new(inner: S) -> Self {
        let anchor = inner.position();
        Self { inner, anchor }
    }

    /// Moves the anchor to the live position.
    pub fn anchor(&mut self) {
        self.anchor = self.inner.position();
    }

    /// Returns the anchor.
    #[inline]
    pub fn anchored_at(&self) -> Position {
        self.anchor
    }

    /// Seeks back to the anchor and returns the scanner.
    pub fn replay(&mut self) -> &mut S {
        self.inner.seek(self.anchor);
        &mut self.inner
    }

    /// Returns the scanner at its live position.
    #[inline]
    pub fn live(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwraps the scanner.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Scan> From<S> for Replaying<S> {
    fn from(inner: S) -> Self {
        Self::new(inner)
    }
}

impl<S: Scan> Scan for Replaying<S> {
    /// Resets the scanner and re-anchors at the start.
    fn reset(&mut self) {
        self.inner.reset();
        self.anchor = Position::default();
    }

    fn rewind(&mut self, steps: usize) {
        self.inner.rewind(steps);
    }

    fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }

    fn position(&self) -> Position {
        self.inner.position()
    }

    fn seek(&mut self, position: Position) {
        self.inner.seek(position);
    }

    fn is_overdrawn(&self) -> bool {
        self.inner.is_overdrawn()
    }

    fn set_overdrawn(&mut self, overdrawn: bool) {
        self.inner.set_overdrawn(overdrawn);
    }
}

impl<'a, S: Scan + Iterator> IntoIterator for &'a mut Replaying<S> {
    type Item = S::Item;
    type IntoIter = &'a mut S;

    fn into_iter(self) -> &'a mut S {
        self.replay()
    }
}
