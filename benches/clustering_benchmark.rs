use custseg::clustering::{linkage, Dbscan, LinkageMethod};
use custseg::distances::{DistanceMetric, EuclideanDistance};
use custseg::resolver::AssignmentResolver;
use custseg::Strategy;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

fn generate_random_data(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((rows, cols), |_| StandardNormal.sample(&mut rng))
}

fn benchmark_distance_computation(c: &mut Criterion) {
    let data = generate_random_data(2, 4, 42);
    let point1 = data.row(0);
    let point2 = data.row(1);

    c.bench_function("distance_computation_euclidean", |b| {
        b.iter(|| EuclideanDistance.compute(black_box(&point1), black_box(&point2)));
    });
}

fn benchmark_linkage(c: &mut Criterion) {
    let mut group = c.benchmark_group("linkage");
    group.sample_size(10);
    for rows in [100, 200, 400] {
        let data = generate_random_data(rows, 4, 7);
        for (name, method) in [("ward", LinkageMethod::Ward), ("complete", LinkageMethod::Complete)] {
            group.bench_with_input(BenchmarkId::new(name, rows), &data, |b, data| {
                b.iter(|| linkage(&data.view(), method).unwrap());
            });
        }
    }
    group.finish();
}

fn benchmark_dbscan(c: &mut Criterion) {
    let data = generate_random_data(400, 4, 11);
    let dbscan = Dbscan::new(0.5, 5);
    c.bench_function("dbscan_400x4", |b| {
        b.iter(|| dbscan.fit_predict(black_box(&data.view())).unwrap());
    });
}

fn benchmark_resolver(c: &mut Criterion) {
    let data = generate_random_data(1000, 4, 3);
    let labels: Vec<i32> = (0..data.nrows()).map(|i| (i % 5) as i32).collect();
    let query = generate_random_data(1, 4, 99);
    let resolver = AssignmentResolver::new();

    c.bench_function("resolver_assign_1000x4", |b| {
        b.iter(|| {
            resolver
                .assign(&query.row(0), Strategy::Agglomerative, &data.view(), &labels)
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    benchmark_distance_computation,
    benchmark_linkage,
    benchmark_dbscan,
    benchmark_resolver
);
criterion_main!(benches);
