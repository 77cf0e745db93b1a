//! Benchmarks for ripple-core
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ripple_core::{batch, derived, proxy, run_microtasks, signal, Value};
use serde_json::json;

fn bench_signal_set(c: &mut Criterion) {
    let s = signal(0i32);
    let _handle = s.subscribe(|v| {
        black_box(*v);
    });
    let mut next = 0;
    c.bench_function("signal_set", |b| {
        b.iter(|| {
            next += 1;
            s.set(black_box(next))
        })
    });
}

fn bench_signal_set_same_value(c: &mut Criterion) {
    let s = signal(42i32);
    c.bench_function("signal_set_same_value", |b| b.iter(|| s.set(black_box(42))));
}

fn bench_batched_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("batched_writes");
    for writes in [1, 10, 100] {
        let s = signal(0i32);
        let _handle = s.subscribe(|v| {
            black_box(*v);
        });
        group.bench_with_input(BenchmarkId::from_parameter(writes), &writes, |b, &writes| {
            b.iter(|| {
                batch(|| (1..=writes).for_each(|i| s.set(i)));
                s.set(0);
                run_microtasks()
            })
        });
    }
    group.finish();
}

fn bench_derived_propagation(c: &mut Criterion) {
    let s = signal(0i32);
    let d = derived(&s, |v| v * 2);
    let mut next = 0;
    c.bench_function("derived_propagation", |b| {
        b.iter(|| {
            next += 1;
            s.set(next);
            black_box(d.value())
        })
    });
}

fn bench_proxy_nested_write(c: &mut Criterion) {
    let items: Vec<Value> = (0..100).map(|i| Value::from(json!({"id": i}))).collect();
    let p = proxy(Value::object([("items", Value::from(items)), ("meta", Value::from(json!({"n": 0})))]));
    let mut next = 0;
    c.bench_function("proxy_nested_write", |b| {
        b.iter(|| {
            next += 1;
            p.value().get("meta").set("n", next)
        })
    });
}

fn bench_proxy_array_push(c: &mut Criterion) {
    c.bench_function("proxy_array_push", |b| {
        b.iter_batched(
            || proxy(json!([1, 2, 3, 4, 5, 6, 7, 8])),
            |p| p.value().tracked().and_then(|arr| arr.push([9])),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_signal_set,
    bench_signal_set_same_value,
    bench_batched_writes,
    bench_derived_propagation,
    bench_proxy_nested_write,
    bench_proxy_array_push,
);
criterion_main!(benches);
