use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use math_convex_hull::{get_convex_hull, testdata};

fn bench_sphere_hulls(c: &mut Criterion) {
    let mut group = c.benchmark_group("quickhull_sphere");
    for n in [100usize, 1000, 5000] {
        let points = testdata::fibonacci_sphere_points(n, 1.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &points, |b, pts| {
            b.iter(|| get_convex_hull(black_box(pts)))
        });
    }
    group.finish();
}

fn bench_interior_cloud(c: &mut Criterion) {
    // Mostly interior points: exercises the outside-set partition
    let points = testdata::random_box_points(20_000, 2.0, 7);
    c.bench_function("quickhull_box_20000", |b| {
        b.iter(|| get_convex_hull(black_box(&points)))
    });
}

criterion_group!(benches, bench_sphere_hulls, bench_interior_cloud);
criterion_main!(benches);
