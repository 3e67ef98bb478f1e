//! Benchmark suite for package set algebra and bulk conversion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pkgsack_core::{BoxError, PackageId, PackageKey, PackageList, PackageSet, Pool};

/// Build a pool with `size` packages.
fn generate_pool(size: usize) -> (Pool, Vec<PackageId>) {
    let pool = Pool::new();
    let ids = (0..size)
        .map(|i| {
            let key = PackageKey::new(format!("pkg{i}"), "1.0-1", "x86_64", "bench");
            pool.intern_package(&key).expect("Failed to intern package")
        })
        .collect();
    (pool, ids)
}

fn bench_union(c: &mut Criterion) {
    let mut group = c.benchmark_group("packageset_union");

    for size in [1_000, 10_000, 100_000].iter() {
        let (pool, ids) = generate_pool(*size);
        let evens = PackageSet::from_ids(&pool, ids.iter().copied().step_by(2)).unwrap();
        let thirds = PackageSet::from_ids(&pool, ids.iter().copied().step_by(3)).unwrap();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(evens.union(&thirds).unwrap()));
        });
    }

    group.finish();
}

fn bench_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("packageset_intersection");

    for size in [1_000, 10_000, 100_000].iter() {
        let (pool, ids) = generate_pool(*size);
        let evens = PackageSet::from_ids(&pool, ids.iter().copied().step_by(2)).unwrap();
        let thirds = PackageSet::from_ids(&pool, ids.iter().copied().step_by(3)).unwrap();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(evens.intersection(&thirds).unwrap().len()));
        });
    }

    group.finish();
}

fn bench_list_to_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("packagelist_from_sequence");

    for size in [1_000, 10_000, 100_000].iter() {
        let (pool, ids) = generate_pool(*size);
        let packages: Vec<_> = ids.iter().filter_map(|&id| pool.package(id)).collect();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let list =
                    PackageList::from_sequence(&pool, packages.as_slice(), Ok::<_, BoxError>)
                        .unwrap();
                black_box(list.to_set().unwrap().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_union, bench_intersection, bench_list_to_set);
criterion_main!(benches);
