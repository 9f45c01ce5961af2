//! Benchmarks for record set scanning.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_core::Value;
use strata_storage::scan::{debounce, ChunkScanner, ElementScanner, ZipScan};
use strata_storage::{RecordSet, ValueScan};

fn populate(groups: usize, per_group: usize) -> RecordSet {
    let rs = RecordSet::with_fields(["id", "price"]).unwrap();
    let rows = (0..groups).map(|g| {
        (0..per_group)
            .map(|r| {
                let id = (g * per_group + r) as i64;
                vec![Value::Int64(id), Value::Float64(100.0 + id as f64 * 0.1)]
            })
            .collect::<Vec<_>>()
    });
    rs.extend_groups(rows).unwrap();
    rs
}

/// Benchmark: element vs chunk scanning over the same records
fn scan_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for per_group in [1usize, 10, 100].iter() {
        let rs = populate(10_000 / per_group, *per_group);

        group.bench_with_input(BenchmarkId::new("element", per_group), &rs, |b, rs| {
            b.iter(|| {
                let scanner = ElementScanner::new(rs, "price").unwrap();
                black_box(scanner.count())
            });
        });

        group.bench_with_input(BenchmarkId::new("chunk", per_group), &rs, |b, rs| {
            b.iter(|| {
                let scanner = ChunkScanner::new(rs, "price").unwrap();
                black_box(scanner.map(|chunk| chunk.len()).sum::<usize>())
            });
        });
    }

    group.finish();
}

/// Benchmark: lock-step reading of two columns followed by debounce
fn zip_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("zip");

    for total in [1_000usize, 10_000].iter() {
        let rs = populate(*total, 1);
        group.bench_with_input(BenchmarkId::new("two_columns", total), &rs, |b, rs| {
            b.iter(|| {
                let mut scanners: Vec<Box<dyn ValueScan>> = vec![
                    Box::new(ElementScanner::new(rs, "id").unwrap()),
                    Box::new(ElementScanner::new(rs, "price").unwrap()),
                ];
                let rows = ZipScan::new(&mut scanners).count();
                debounce(scanners.iter_mut().map(|s| s.as_mut()));
                black_box(rows)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, scan_benchmark, zip_benchmark);
criterion_main!(benches);
