use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use platetrack_rs::{
    config::{PipelineConfig, TrackerConfig},
    object::Object,
    plate::PlateDetection,
    rect::Rect,
    sort::SortTracker,
    trajectory::{canonicalize, interpolate},
    PlatePipeline,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const NUM_FRAMES: usize = 300;

/* ----------------------------------------------------------------------------
 * Synthetic traffic
 * ---------------------------------------------------------------------------- */

struct Vehicle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    w: f32,
    h: f32,
}

/// Vehicles drifting across a 1920x1080 scene with jittered boxes and an
/// occasional missed detection.
fn synthetic_frames(num_vehicles: usize, seed: u64) -> Vec<(Vec<Object>, Vec<PlateDetection>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut vehicles: Vec<Vehicle> = (0..num_vehicles)
        .map(|_| Vehicle {
            x: rng.gen_range(0.0..1700.0),
            y: rng.gen_range(0.0..900.0),
            vx: rng.gen_range(-4.0..4.0),
            vy: rng.gen_range(-3.0..3.0),
            w: rng.gen_range(80.0..220.0),
            h: rng.gen_range(60.0..160.0),
        })
        .collect();

    let mut frames = Vec::with_capacity(NUM_FRAMES);
    for _ in 0..NUM_FRAMES {
        let mut objs = Vec::new();
        let mut plates = Vec::new();
        for v in vehicles.iter_mut() {
            v.x += v.vx;
            v.y += v.vy;
            if rng.gen_bool(0.1) {
                continue;
            }
            let jitter: f32 = rng.gen_range(-1.5..1.5);
            let Ok(rect) = Rect::from_tlwh(v.x + jitter, v.y - jitter, v.w, v.h) else {
                continue;
            };
            objs.push(Object::detection(rect, rng.gen_range(0.5..1.0)));
            if rng.gen_bool(0.5) {
                if let Ok(plate) = Rect::from_tlwh(v.x + v.w * 0.4, v.y + v.h * 0.7, v.w * 0.2, v.h * 0.1) {
                    plates.push(PlateDetection::new(
                        plate,
                        0.8,
                        Some("AB12CDE".to_string()),
                        Some(rng.gen_range(0.1..1.0)),
                    ));
                }
            }
        }
        frames.push((objs, plates));
    }
    frames
}

/* ----------------------------------------------------------------------------
 * Benchmarks
 * ---------------------------------------------------------------------------- */

fn bench_sort_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_tracker");
    for num_vehicles in [10, 50, 100] {
        let frames = synthetic_frames(num_vehicles, 42);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_vehicles),
            &frames,
            |b, frames| {
                b.iter(|| {
                    let mut tracker = SortTracker::new(TrackerConfig::dense());
                    for (objs, _) in frames.iter() {
                        let _ = tracker.update(objs);
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let frames = synthetic_frames(30, 7);

    c.bench_function("plate_pipeline_30_vehicles", |b| {
        b.iter(|| {
            let config = PipelineConfig {
                tracker: TrackerConfig::dense(),
                ..PipelineConfig::default()
            };
            let categories = config.categories.clone();
            let mut pipeline = PlatePipeline::new(config);
            for (frame, (objs, plates)) in frames.iter().enumerate() {
                let _ = pipeline.process_frame(frame, objs, plates);
            }
            let store = pipeline.finish();
            if let Ok(filled) = interpolate(&store) {
                let _ = canonicalize(&filled, &categories);
            }
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(3));
    targets = bench_sort_tracker, bench_full_pipeline
}
criterion_main!(benches);
