use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tilegen_core::{
    generate_map, GroundTileType, MapPresets, NoiseField, NoiseSettings, Pipeline, ThresholdPaint,
    TileGrid, DEFAULT_PRESET_ID,
};

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("noise");
    let settings = NoiseSettings::default();

    for size in [32u32, 64, 128, 256] {
        group.bench_with_input(BenchmarkId::new("field", size), &size, |b, &size| {
            b.iter(|| NoiseField::generate(size, size, 42, &settings))
        });
    }

    group.finish();
}

fn bench_threshold_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("threshold_pipeline");
    let bands = [
        (0.35, GroundTileType::DeepWater.code()),
        (0.45, GroundTileType::Sand.code()),
        (0.8, GroundTileType::Grass.code()),
        (1.0, GroundTileType::Stone.code()),
    ];

    for size in [32u32, 64, 128] {
        group.bench_with_input(BenchmarkId::new("grid", size), &size, |b, &size| {
            let pipeline = Pipeline::new()
                .with_stage(ThresholdPaint::new(bands, NoiseSettings::default()));
            b.iter_batched(
                || TileGrid::new(size, size, 7),
                |mut grid| pipeline.run(&mut grid),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_builtin_preset(c: &mut Criterion) {
    let presets = MapPresets::builtin();
    let Some(preset) = presets.get(DEFAULT_PRESET_ID) else {
        return;
    };
    c.bench_function("preset/island", |b| b.iter(|| generate_map(preset, Some(42))));
}

criterion_group!(
    pipeline_benches,
    bench_noise,
    bench_threshold_pipeline,
    bench_builtin_preset
);
criterion_main!(pipeline_benches);
