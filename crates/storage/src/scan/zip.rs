//! Lock-step reading of several scanners.

use super::{Scan, ValueScan};
use alloc::boxed::Box;
use alloc::vec::Vec;
use strata_core::Value;

/// Reads one value from each scanner per step, stopping at the first that runs out.
///
/// Scanners before the one that ran out have already given up a value for the
/// unfinished row; they are marked overdrawn so `debounce` hands it back. Yields
/// nothing when no scanner is bounded.
pub struct ZipScan<'a> {
    scanners: &'a mut [Box<dyn ValueScan>],
    done: bool,
}

impl<'a> ZipScan<'a> {
    /// Zips the given scanners in order.
    pub fn new(scanners: &'a mut [Box<dyn ValueScan>]) -> Self {
        let done = !scanners.iter().any(|scanner| scanner.is_bounded());
        Self { scanners, done }
    }
}

impl Iterator for ZipScan<'_> {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Vec<Value>> {
        if self.done {
            return None;
        }
        let mut row = Vec::with_capacity(self.scanners.len());
        for index in 0..self.scanners.len() {
            match self.scanners[index].next_value() {
                Some(value) => row.push(value),
                None => {
                    for scanner in self.scanners[..index].iter_mut() {
                        scanner.set_overdrawn(true);
                    }
                    self.done = true;
                    return None;
                }
            }
        }
        Some(row)
    }
}

/// Realigns scanners after a lock-step pass.
///
/// A scanner is settled when it is exhausted and gave nothing up for an unfinished
/// row. If every scanner is settled nothing happens; otherwise scanners are rewound
/// by one step, in order, up to the first settled one. Overdrawn marks are cleared.
pub fn debounce<'a, S, I>(scanners: I)
where
    S: Scan + ?Sized + 'a,
    I: IntoIterator<Item = &'a mut S>,
{
    let mut scanners: Vec<&'a mut S> = scanners.into_iter().collect();
    let settled: Vec<bool> = scanners
        .iter_mut()
        .map(|scanner| {
            let overdrawn = scanner.is_overdrawn();
            scanner.set_overdrawn(false);
            scanner.is_exhausted() && !overdrawn
        })
        .collect();
    if settled.iter().all(|s| *s) {
        return;
    }
    for (index, (scanner, settled)) in scanners.iter_mut().zip(&settled).enumerate() {
        if *settled {
            break;
        }
        scanner.rewind(1);
        let position = scanner.position();
        tracing::trace!(
            scanner = index,
            group = position.group,
            record = position.record,
            "rewound scanner"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_set::RecordSet;
    use crate::scan::{ConstantScanner, ElementScanner};
    use alloc::vec;

    fn column(values: &[i64]) -> RecordSet {
        let rs = RecordSet::with_fields(["v"]).unwrap();
        rs.append(values.iter().map(|v| vec![Value::from(*v)]).collect::<Vec<_>>())
            .unwrap();
        rs
    }

    fn scanners(sets: &[&RecordSet]) -> Vec<Box<dyn ValueScan>> {
        sets.iter()
            .map(|rs| Box::new(ElementScanner::new(rs, "v").unwrap()) as Box<dyn ValueScan>)
            .collect()
    }

    fn pass(scanners: &mut [Box<dyn ValueScan>]) -> Vec<Vec<Value>> {
        let rows: Vec<_> = ZipScan::new(scanners).collect();
        debounce(scanners.iter_mut().map(|s| s.as_mut()));
        rows
    }

    #[test]
    fn test_zip_stops_at_shortest() {
        let a = column(&[1, 2, 3]);
        let b = column(&[10, 20]);
        let mut zipped = scanners(&[&a, &b]);
        let rows = pass(&mut zipped);
        assert_eq!(
            rows,
            vec![
                vec![Value::from(1), Value::from(10)],
                vec![Value::from(2), Value::from(20)],
            ]
        );
    }

    #[test]
    fn test_overdrawn_value_is_not_lost() {
        let a = column(&[1, 2, 3]);
        let b = column(&[10, 20]);
        let mut zipped = scanners(&[&a, &b]);
        assert_eq!(pass(&mut zipped).len(), 2);

        b.append(vec![vec![Value::from(30)]]).unwrap();
        assert_eq!(pass(&mut zipped), vec![vec![Value::from(3), Value::from(30)]]);
        assert!(pass(&mut zipped).is_empty());
    }

    #[test]
    fn test_trailing_scanner_keeps_its_place() {
        let a = column(&[1]);
        let b = column(&[10, 20]);
        let mut zipped = scanners(&[&a, &b]);
        assert_eq!(pass(&mut zipped).len(), 1);

        a.append(vec![vec![Value::from(2)]]).unwrap();
        assert_eq!(pass(&mut zipped), vec![vec![Value::from(2), Value::from(20)]]);
    }

    #[test]
    fn test_constant_broadcasts() {
        let a = column(&[1, 2]);
        let mut zipped = scanners(&[&a]);
        zipped.insert(0, Box::new(ConstantScanner::new(Value::from("k"))));
        let rows = pass(&mut zipped);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec![Value::from("k"), Value::from(2)]);
    }

    #[test]
    fn test_zip_of_nothing_is_empty() {
        let mut none: Vec<Box<dyn ValueScan>> = Vec::new();
        assert_eq!(ZipScan::new(&mut none).count(), 0);

        let mut constants: Vec<Box<dyn ValueScan>> =
            vec![Box::new(ConstantScanner::new(Value::Null))];
        assert_eq!(ZipScan::new(&mut constants).count(), 0);
    }
}
