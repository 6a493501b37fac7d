use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cim_effect_cache::{base_operation, deps, operation, CompositionCache, EffectScope, Operation};

fn targets(count: usize) -> Vec<Operation<(u64,), u64>> {
    (0..count)
        .map(|i| operation(move |(x,)| x.wrapping_add(i as u64)))
        .collect()
}

fn benchmark_wrap_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrap_hit");

    for size in [1, 100, 10_000].iter() {
        let cache = CompositionCache::new(base_operation(|| {}));
        let targets = targets(*size);
        let held: Vec<_> = targets.iter().map(|t| cache.wrap(t)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(cache.wrap(&targets[0])))
        });
        drop(held);
    }

    group.finish();
}

fn benchmark_wrap_miss(c: &mut Criterion) {
    c.bench_function("wrap_miss", |b| {
        let cache = CompositionCache::new(base_operation(|| {}));
        b.iter(|| {
            let target: Operation<(u64,), u64> = operation(|(x,)| x);
            black_box(cache.wrap(&target))
        })
    });
}

fn benchmark_epoch_transition(c: &mut Criterion) {
    c.bench_function("epoch_transition", |b| {
        let mut scope = EffectScope::new();
        let target: Operation<(u64,), u64> = operation(|(x,)| x);
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            black_box(scope.create_with_effect(|| {}, deps![counter]).wrap(&target))
        })
    });
}

fn benchmark_stable_render(c: &mut Criterion) {
    c.bench_function("stable_render", |b| {
        let mut scope = EffectScope::new();
        let target: Operation<(u64,), u64> = operation(|(x,)| x);
        b.iter(|| black_box(scope.create_with_effect(|| {}, deps![1, "mode"]).wrap(&target)))
    });
}

fn benchmark_invocation(c: &mut Criterion) {
    c.bench_function("composite_invocation", |b| {
        let cache = CompositionCache::new(base_operation(|| {}));
        let target: Operation<(u64,), u64> = operation(|(x,)| x.wrapping_mul(3));
        let composite = cache.wrap(&target);
        b.iter(|| black_box(composite((black_box(7),))))
    });
}

criterion_group!(
    benches,
    benchmark_wrap_hit,
    benchmark_wrap_miss,
    benchmark_epoch_transition,
    benchmark_stable_render,
    benchmark_invocation
);
criterion_main!(benches);
