#![cfg(feature = "rayon")]

use platebox::lowlevel::{decode_par, OUTPUT_CHANNELS};
use platebox::{
    decode, AffineGrid, Detector, DetectorConfig, ImageDimensions, ProbabilityGrid,
};

fn make_grids(rows: usize, cols: usize) -> (Vec<f32>, Vec<f32>) {
    let mut probs = Vec::with_capacity(rows * cols);
    let mut affines = Vec::with_capacity(rows * cols * 6);
    for row in 0..rows {
        for col in 0..cols {
            let value = ((row * 7 + col * 13) % 10) as f32 / 10.0;
            probs.push(value);
            let s = 0.05 + value * 0.3;
            affines.extend_from_slice(&[s, 0.01 * col as f32, 0.0, 0.0, s, -0.01 * row as f32]);
        }
    }
    (probs, affines)
}

#[test]
fn parallel_decode_matches_sequential_order() {
    let (rows, cols) = (38, 57);
    let (probs, affines) = make_grids(rows, cols);
    let probs = ProbabilityGrid::new(&probs, rows, cols).unwrap();
    let affines = AffineGrid::new(&affines, rows, cols).unwrap();

    let seq = decode(probs, affines, 0.5).unwrap();
    let par = decode_par(probs, affines, 0.5).unwrap();
    assert!(!seq.is_empty());
    assert_eq!(seq, par);
}

#[test]
fn parallel_detector_matches_sequential() {
    let dims = ImageDimensions::new(1920, 1080).unwrap();
    let (rows, cols) = (32, 57);
    let (probs, affines) = make_grids(rows, cols);
    let mut tensor = Vec::with_capacity(rows * cols * OUTPUT_CHANNELS);
    for (prob, params) in probs.iter().zip(affines.chunks_exact(6)) {
        tensor.push(*prob);
        tensor.push(1.0 - *prob);
        tensor.extend_from_slice(params);
    }

    let mut seq = Detector::new();
    let mut par = Detector::new().with_config(DetectorConfig {
        parallel: true,
        ..DetectorConfig::default()
    });
    let a = seq.detect_tensor(dims, &tensor).unwrap();
    let b = par.detect_tensor(dims, &tensor).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}
