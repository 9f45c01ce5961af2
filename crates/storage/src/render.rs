//! Text rendering of record sets.

use crate::record_set::RecordSet;
use core::fmt;

/// Controls how much of a record set `render` prints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Groups beyond this count are elided.
    pub elide_after: usize,
    /// Trailing groups still shown after the elision marker.
    pub tail: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            elide_after: 20,
            tail: 5,
        }
    }
}

/// Borrowing adapter returned by `RecordSet::render`.
pub struct Rendered<'a> {
    set: &'a RecordSet,
    options: RenderOptions,
}

impl RecordSet {
    /// Returns a `Display` adapter using `options`.
    pub fn render(&self, options: RenderOptions) -> Rendered<'_> {
        Rendered { set: self, options }
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups = self.set.groups();
        writeln!(
            f,
            "RecordSet{} [{} groups, {} records]",
            self.set.schema(),
            groups.len(),
            groups.iter().map(|g| g.len()).sum::<usize>()
        )?;

        let total = groups.len();
        let tail = self.options.tail.min(self.options.elide_after);
        let head = if total > self.options.elide_after {
            self.options.elide_after - tail
        } else {
            total
        };
        for (index, group) in groups.iter().enumerate() {
            if index == head && head < total.saturating_sub(tail) {
                writeln!(f, "  ...")?;
            }
            if index >= head && index < total.saturating_sub(tail) {
                continue;
            }
            write!(f, "  {}:", index)?;
            for record in group.iter() {
                write!(f, " (")?;
                for (i, value) in record.values().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(RenderOptions::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use strata_core::Value;

    fn counting(groups: i64) -> RecordSet {
        let rs = RecordSet::with_fields(["n"]).unwrap();
        for i in 0..groups {
            rs.append(vec![vec![Value::Int64(i)]]).unwrap();
        }
        rs
    }

    #[test]
    fn test_render_small_set() {
        let rs = RecordSet::with_fields(["a", "b"]).unwrap();
        rs.append(vec![
            vec![Value::Int64(1), Value::from("x")],
            vec![Value::Int64(2), Value::Null],
        ])
        .unwrap();
        let text = rs.to_string();
        assert_eq!(
            text,
            "RecordSet(a, b) [1 groups, 2 records]\n  0: (1, 'x') (2, null)\n"
        );
    }

    #[test]
    fn test_render_elides_middle_groups() {
        let rs = counting(10);
        let text = rs
            .render(RenderOptions {
                elide_after: 4,
                tail: 1,
            })
            .to_string();
        let lines: alloc::vec::Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "RecordSet(n) [10 groups, 10 records]",
                "  0: (0)",
                "  1: (1)",
                "  2: (2)",
                "  ...",
                "  9: (9)",
            ]
        );
    }

    #[test]
    fn test_render_no_elision_at_limit() {
        let rs = counting(4);
        let text = rs
            .render(RenderOptions {
                elide_after: 4,
                tail: 1,
            })
            .to_string();
        assert!(!text.contains("..."));
        assert_eq!(text.lines().count(), 5);
    }
}
