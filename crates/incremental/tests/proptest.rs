//! Property-based tests for strata-incremental using proptest.

use proptest::prelude::*;
use strata_core::Value;
use strata_incremental::{aggregate, cluster, sweep, Cluster, Formula, Merge, Source};
use strata_storage::RecordSet;

fn groups_strategy() -> impl Strategy<Value = Vec<Vec<i64>>> {
    prop::collection::vec(prop::collection::vec(-50i64..50, 0..6), 0..12)
}

fn column(name: &str) -> RecordSet {
    RecordSet::with_fields([name]).unwrap()
}

fn append(rs: &RecordSet, values: &[i64]) {
    rs.append(values.iter().map(|v| vec![Value::Int64(*v)]).collect::<Vec<_>>())
        .unwrap();
}

fn ints(rs: &RecordSet) -> Vec<Vec<i64>> {
    rs.groups()
        .iter()
        .map(|g| g.iter().map(|r| r.values()[0].as_i64().unwrap()).collect())
        .collect()
}

proptest! {
    /// However appends and applies interleave, a sweep maps every record once.
    #[test]
    fn sweep_matches_offline_map(
        groups in groups_strategy(),
        applies in prop::collection::vec(any::<bool>(), 0..12)
    ) {
        let rs = column("v");
        let node = sweep(vec![Source::from(&rs)], Formula::parse("v * 2 - 1").unwrap(), ["w"]).unwrap();

        for (i, group) in groups.iter().enumerate() {
            append(&rs, group);
            if applies.get(i).copied().unwrap_or(false) {
                node.apply().unwrap();
            }
        }
        let got: Vec<i64> = ints(&node.results().unwrap()).concat();
        let want: Vec<i64> = groups.concat().iter().map(|v| v * 2 - 1).collect();
        prop_assert_eq!(got, want);
    }

    /// A cluster calculation emits exactly one output group per input group.
    #[test]
    fn cluster_calculation_mirrors_grouping(
        groups in groups_strategy(),
        applies in prop::collection::vec(any::<bool>(), 0..12)
    ) {
        let rs = column("v");
        let node = cluster(vec![Source::from(&rs)], Formula::parse("-v").unwrap(), ["w"]).unwrap();

        for (i, group) in groups.iter().enumerate() {
            append(&rs, group);
            if applies.get(i).copied().unwrap_or(false) {
                node.apply().unwrap();
            }
        }
        let want: Vec<Vec<i64>> = groups
            .iter()
            .map(|g| g.iter().map(|v| -v).collect())
            .collect();
        prop_assert_eq!(ints(&node.results().unwrap()), want);
    }

    /// An aggregate always holds exactly one record with the current total.
    #[test]
    fn aggregate_tracks_total(groups in groups_strategy()) {
        let rs = column("v");
        let node = aggregate(vec![Source::from(&rs)], Formula::parse("sum(v)").unwrap(), ["total"]).unwrap();

        let mut total = 0;
        for group in &groups {
            append(&rs, group);
            total += group.iter().sum::<i64>();
            prop_assert_eq!(ints(&node.results().unwrap()), vec![vec![total]]);
        }
    }

    /// Cluster output concatenates back to its input, with one key per group and
    /// differing keys between neighbours.
    #[test]
    fn cluster_transform_splits_runs(
        groups in prop::collection::vec(prop::collection::vec(0i64..3, 0..6), 0..10),
        applies in prop::collection::vec(any::<bool>(), 0..10)
    ) {
        let rs = column("k");
        let node = Cluster::build(&rs, "k").unwrap();
        for (i, group) in groups.iter().enumerate() {
            append(&rs, group);
            if applies.get(i).copied().unwrap_or(false) {
                node.apply().unwrap();
            }
        }
        let out = ints(&node.results().unwrap());
        prop_assert_eq!(out.concat(), groups.concat());
        for group in &out {
            prop_assert!(!group.is_empty());
            prop_assert!(group.iter().all(|k| *k == group[0]));
        }
        for pair in out.windows(2) {
            prop_assert_ne!(pair[0][0], pair[1][0]);
        }
    }

    /// Merging two columns of unequal length never loses or repeats a pairing.
    #[test]
    fn merge_pairs_in_order(
        left in groups_strategy(),
        right in groups_strategy()
    ) {
        let a = column("a");
        let b = column("b");
        let node = Merge::build([&a, &b]).unwrap();
        let rounds = left.len().max(right.len());
        for i in 0..rounds {
            if let Some(group) = left.get(i) {
                append(&a, group);
            }
            if let Some(group) = right.get(i) {
                append(&b, group);
            }
            node.apply().unwrap();
        }

        let flat_left = left.concat();
        let flat_right = right.concat();
        let pairs: Vec<(i64, i64)> = node
            .records()
            .unwrap()
            .iter()
            .map(|r| (r.values()[0].as_i64().unwrap(), r.values()[1].as_i64().unwrap()))
            .collect();
        let want: Vec<(i64, i64)> = flat_left.into_iter().zip(flat_right).collect();
        prop_assert_eq!(pairs, want);
    }
}
