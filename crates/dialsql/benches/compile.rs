use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dialsql::prelude::*;
use dialsql::Select;

/// SELECT col0, col1, ... FROM t WHERE col0 = ? AND col1 = ? ...
fn build_select(n: usize) -> Select {
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut q = select("t").columns(&refs);
    for (i, column) in columns.iter().enumerate() {
        q = q.eq(column, i as i64);
    }
    q
}

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/prepare");
    let compiler = Compiler::new(DialectKind::Postgres);

    for n in [1, 5, 10, 50, 100] {
        let q = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(compiler.prepare(q.clone())));
        });
    }

    group.finish();
}

fn bench_inline(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/inline");
    let compiler = Compiler::new(DialectKind::MySql);

    for n in [1, 5, 10, 50, 100] {
        let q = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(compiler.to_sql(q.clone())));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/in_list");
    let compiler = Compiler::new(DialectKind::Sqlite);

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let q = select("t").in_list("id", values.clone());
                black_box(compiler.prepare(q))
            });
        });
    }

    group.finish();
}

fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/nested_subqueries");
    let compiler = Compiler::new(DialectKind::MySql);

    for depth in [1, 4, 16] {
        let mut q = select("t0").columns(&["id"]).eq("k", 0);
        for i in 1..=depth {
            q = select(&format!("t{i}"))
                .columns(&["id"])
                .eq("k", i as i64)
                .in_subquery("id", q);
        }
        group.bench_with_input(BenchmarkId::from_parameter(depth), &q, |b, q| {
            b.iter(|| black_box(compiler.prepare(q.clone())));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_prepare,
    bench_inline,
    bench_in_list,
    bench_nested
);
criterion_main!(benches);
