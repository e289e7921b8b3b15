use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tt_bench::gen_match_samples;
use tt_core::{match_building, normalize, orientations, BuildingKind};

fn bench_match_building(c: &mut Criterion) {
    let mut g = c.benchmark_group("tt_core_matching");
    for &n in &[64usize, 1024usize] {
        let samples = gen_match_samples(n, 5);
        g.bench_with_input(BenchmarkId::new("match_building_batch", n), &samples, |b, s| {
            b.iter(|| {
                for sample in s.iter() {
                    black_box(match_building(
                        black_box(&sample.grid),
                        &sample.selected,
                        sample.building.name(),
                        5,
                    ));
                }
            })
        });
    }
    g.finish();
}

fn bench_orientations(c: &mut Criterion) {
    let base = BuildingKind::Factory.template().patterns[0];
    c.bench_function("orientations_factory", |b| {
        b.iter(|| black_box(orientations(black_box(base))))
    });
    c.bench_function("normalize_factory", |b| {
        b.iter(|| black_box(normalize(black_box(base))))
    });
}

criterion_group!(benches, bench_match_building, bench_orientations);
criterion_main!(benches);
