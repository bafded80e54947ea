use platebox::lowlevel::OUTPUT_CHANNELS;
use platebox::{
    compute_target_size, decode, sort_candidates_desc, suppress, AffineGrid, Detector,
    DetectorConfig, ImageDimensions, ProbabilityGrid,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_tensor(rows: usize, cols: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(rows * cols * OUTPUT_CHANNELS);
    for row in 0..rows {
        for col in 0..cols {
            let value = ((row * 13) ^ (col * 7) ^ (row * col)) & 0xFF;
            let prob = value as f32 / 255.0;
            let scale = 0.05 + prob * 0.2;
            data.extend_from_slice(&[prob, 1.0 - prob, scale, 0.02, 0.0, -0.01, scale * 0.4, 0.0]);
        }
    }
    data
}

fn split(tensor: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let mut probs = Vec::new();
    let mut affines = Vec::new();
    for cell in tensor.chunks_exact(OUTPUT_CHANNELS) {
        probs.push(cell[0]);
        affines.extend_from_slice(&cell[2..]);
    }
    (probs, affines)
}

fn bench_pipeline(c: &mut Criterion) {
    let dims = ImageDimensions::new(640, 480).unwrap();
    let size = compute_target_size(640, 480).unwrap();
    let (rows, cols) = (size.grid_rows(), size.grid_cols());
    let tensor = make_tensor(rows, cols);
    let (probs, affines) = split(&tensor);
    let probs_view = ProbabilityGrid::new(&probs, rows, cols).unwrap();
    let affines_view = AffineGrid::new(&affines, rows, cols).unwrap();

    c.bench_function("decode_640x480", |b| {
        b.iter(|| black_box(decode(probs_view, affines_view, 0.5).unwrap()));
    });

    let mut sorted = decode(probs_view, affines_view, 0.5).unwrap();
    sort_candidates_desc(&mut sorted);
    c.bench_function("suppress_640x480", |b| {
        b.iter(|| black_box(suppress(&sorted, 0.1)));
    });

    let mut detector = Detector::new();
    c.bench_function("detect_tensor_640x480", |b| {
        b.iter(|| black_box(detector.detect_tensor(dims, &tensor).unwrap()));
    });

    if cfg!(feature = "rayon") {
        let mut detector_par = Detector::new().with_config(DetectorConfig {
            parallel: true,
            ..DetectorConfig::default()
        });
        c.bench_function("detect_tensor_640x480_parallel", |b| {
            b.iter(|| black_box(detector_par.detect_tensor(dims, &tensor).unwrap()));
        });
    }
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
