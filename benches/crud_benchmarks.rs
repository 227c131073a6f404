use avl_index::{AvlTree, DualIndex};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeSet;
use std::hint::black_box;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn key_orders() -> [(&'static str, Vec<i64>); 3] {
    [
        ("ordered", ordered_keys(N)),
        ("reverse", reverse_ordered_keys(N)),
        ("random", random_keys(N)),
    ]
}

// ─── Tree Benchmarks ────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("insert_{order}"));

        group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
            b.iter(|| {
                let mut tree = AvlTree::new();
                for &k in &keys {
                    tree.insert(k);
                }
                tree
            });
        });

        group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
            b.iter(|| {
                let mut set = BTreeSet::new();
                for &k in &keys {
                    set.insert(k);
                }
                set
            });
        });

        group.finish();
    }
}

fn bench_contains(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("contains_{order}"));
        let tree: AvlTree<i64> = keys.iter().copied().collect();
        let set: BTreeSet<i64> = keys.iter().copied().collect();

        group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
            b.iter(|| {
                for k in &keys {
                    black_box(tree.contains(k));
                }
            });
        });

        group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
            b.iter(|| {
                for k in &keys {
                    black_box(set.contains(k));
                }
            });
        });

        group.finish();
    }
}

fn bench_remove(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("remove_{order}"));
        let tree: AvlTree<i64> = keys.iter().copied().collect();
        let set: BTreeSet<i64> = keys.iter().copied().collect();

        group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
            b.iter_batched(
                || tree.clone(),
                |mut tree| {
                    for k in &keys {
                        tree.remove(k);
                    }
                    tree
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
            b.iter_batched(
                || set.clone(),
                |mut set| {
                    for k in &keys {
                        set.remove(k);
                    }
                    set
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.finish();
    }
}

fn bench_find_closest(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_closest_random");
    let stored: Vec<i64> = random_keys(N).into_iter().map(|k| k * 2).collect();
    let probes = random_keys(N);
    let tree: AvlTree<i64> = stored.iter().copied().collect();
    let set: BTreeSet<i64> = stored.iter().copied().collect();

    group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
        b.iter(|| {
            for k in &probes {
                black_box(tree.find_closest(k));
            }
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            for k in &probes {
                black_box(set.range(k..).next());
            }
        });
    });

    group.finish();
}

// ─── Dual Index Benchmarks ──────────────────────────────────────────────────

fn bench_update_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("dual_index_update_rank");
    let mut index = DualIndex::new();
    for (id, rank) in random_keys(N).into_iter().enumerate() {
        index.insert(id, rank).unwrap();
    }

    group.bench_function(BenchmarkId::new("DualIndex", N), |b| {
        b.iter_batched(
            || index.clone(),
            |mut index| {
                for id in 0..N {
                    index.update_rank(id, id as i64).unwrap();
                }
                index
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(tree_benches, bench_insert, bench_contains, bench_remove, bench_find_closest,);

criterion_group!(dual_index_benches, bench_update_rank,);

criterion_main!(tree_benches, dual_index_benches);
