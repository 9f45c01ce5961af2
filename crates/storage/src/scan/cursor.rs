//! The cursor shared by record-set scanners.

use super::Position;
use crate::record_set::{RecordGroup, RecordSet, WeakRecordSet};
use strata_core::Record;

pub(crate) struct Cursor {
    source: WeakRecordSet,
    position: Position,
    pub(crate) overdrawn: bool,
}

impl Cursor {
    pub(crate) fn new(source: &RecordSet) -> Self {
        Self {
            source: source.downgrade(),
            position: Position::default(),
            overdrawn: false,
        }
    }

    pub(crate) fn source(&self) -> Option<RecordSet> {
        self.source.upgrade()
    }

    #[inline]
    pub(crate) fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub(crate) fn seek(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn reset(&mut self) {
        self.position = Position::default();
        self.overdrawn = false;
    }

    /// A cursor whose record set is gone counts as exhausted.
    pub(crate) fn is_exhausted(&self) -> bool {
        match self.source.upgrade() {
            Some(source) => self.position.record == 0 && self.position.group >= source.len(),
            None => true,
        }
    }

    pub(crate) fn next_record(&mut self) -> Option<Record> {
        let source = self.source.upgrade()?;
        let groups = source.borrow_groups();
        loop {
            let Position { group, record } = self.position;
            let current = groups.get(group)?;
            if record < current.len() {
                self.position = if record + 1 == current.len() {
                    Position::new(group + 1, 0)
                } else {
                    Position::new(group, record + 1)
                };
                return Some(current[record].clone());
            }
            self.position = Position::new(group + 1, 0);
        }
    }

    pub(crate) fn next_group(&mut self) -> Option<RecordGroup> {
        let source = self.source.upgrade()?;
        let groups = source.borrow_groups();
        let current = groups.get(self.position.group)?.clone();
        self.position = Position::new(self.position.group + 1, 0);
        Some(current)
    }

    pub(crate) fn rewind_records(&mut self, steps: usize) {
        let Some(source) = self.source.upgrade() else {
            self.position = Position::default();
            return;
        };
        let groups = source.borrow_groups();
        for _ in 0..steps {
            if self.position.record > 0 {
                self.position.record -= 1;
                continue;
            }
            // step back into the last record of the previous non-empty group
            let mut group = self.position.group.min(groups.len());
            let previous = loop {
                if group == 0 {
                    break None;
                }
                group -= 1;
                if !groups[group].is_empty() {
                    break Some(Position::new(group, groups[group].len() - 1));
                }
            };
            match previous {
                Some(position) => self.position = position,
                None => {
                    self.position = Position::default();
                    return;
                }
            }
        }
    }

    pub(crate) fn rewind_groups(&mut self, steps: usize) {
        self.position = Position::new(self.position.group.saturating_sub(steps), 0);
    }
}
