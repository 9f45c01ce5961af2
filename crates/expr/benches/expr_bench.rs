//! Benchmarks for formula compilation and evaluation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_core::Value;
use strata_expr::Expression;

const FORMULAS: &[(&str, &str)] = &[
    ("arith", "a * 2 + b - 1"),
    ("logic", "a > 1 and b < 5 or not a"),
    ("math", "math.sqrt(a ** 2 + b ** 2)"),
    ("nested", "max((a + b) * (a - b), abs(a - b), 0) // 3"),
];

/// Benchmark: compile once per iteration
fn compile_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr_compile");
    for (name, formula) in FORMULAS {
        group.bench_with_input(BenchmarkId::from_parameter(name), formula, |b, formula| {
            b.iter(|| black_box(Expression::compile(formula).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: evaluate a compiled closure tree over many rows
fn evaluate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr_evaluate");
    let rows: Vec<[Value; 2]> = (0..1000i64)
        .map(|i| [Value::Int64(i), Value::Int64(i % 7)])
        .collect();

    for (name, formula) in FORMULAS {
        let expr = Expression::compile(formula).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &rows, |b, rows| {
            b.iter(|| {
                for row in rows {
                    black_box(expr.call(row).unwrap());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, compile_benchmark, evaluate_benchmark);
criterion_main!(benches);
