use platebox::lowlevel::OUTPUT_CHANNELS;
use platebox::{
    AffineGrid, Detection, Detector, DetectorConfig, ImageDimensions, PlateBoxError,
    ProbabilityGrid, ResizeParams, PLATE_LABEL,
};

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
const SMALL: [f32; 6] = [0.1, 0.0, 0.0, 0.0, 0.1, 0.0];

/// Sizing that maps any square image to a 32x32 input, i.e. a 2x2 grid.
fn two_by_two() -> ResizeParams {
    ResizeParams {
        short_side: 32,
        max_bound: 32,
        stride: 16,
    }
}

fn affines_filled(cells: usize, params: [f32; 6]) -> Vec<f32> {
    params.iter().copied().cycle().take(cells * 6).collect()
}

fn confidences(detections: &[Detection]) -> Vec<f32> {
    detections.iter().map(Detection::confidence).collect()
}

fn make_tensor(
    rows: usize,
    cols: usize,
    hits: &[(usize, usize, f32)],
    params: [f32; 6],
) -> Vec<f32> {
    let mut tensor = vec![0.0f32; rows * cols * OUTPUT_CHANNELS];
    for cell in tensor.chunks_exact_mut(OUTPUT_CHANNELS) {
        cell[1] = 1.0;
        cell[2..].copy_from_slice(&params);
    }
    for &(row, col, prob) in hits {
        let base = (row * cols + col) * OUTPUT_CHANNELS;
        tensor[base] = prob;
        tensor[base + 1] = 1.0 - prob;
    }
    tensor
}

#[test]
fn two_confident_cells_survive_loose_suppression() {
    let dims = ImageDimensions::new(100, 100).unwrap();
    let probs = [0.9, 0.2, 0.95, 0.05];
    let affines = affines_filled(4, IDENTITY);

    let mut detector = Detector::new()
        .with_resize_params(two_by_two())
        .with_config(DetectorConfig {
            iou_threshold: 0.9,
            ..DetectorConfig::default()
        });
    let detections = detector
        .detect(
            dims,
            ProbabilityGrid::new(&probs, 2, 2).unwrap(),
            AffineGrid::new(&affines, 2, 2).unwrap(),
        )
        .unwrap();

    assert_eq!(confidences(&detections), vec![0.95, 0.9]);
    assert_eq!(detections[0].id(), "0");
    assert_eq!(detections[1].id(), "1");
    assert!(detections.iter().all(|d| d.label() == PLATE_LABEL));

    // Cell (1, 0): x in (0.5 +- 3.875) / 2, y in (1.5 +- 3.875) / 2, scaled by 100.
    let rect = detections[0].rect();
    assert!((rect.left + 168.75).abs() < 1e-3);
    assert!((rect.right - 218.75).abs() < 1e-3);
    assert!((rect.top + 118.75).abs() < 1e-3);
    assert!((rect.bottom - 268.75).abs() < 1e-3);
}

#[test]
fn identity_boxes_overlap_under_default_threshold() {
    let dims = ImageDimensions::new(100, 100).unwrap();
    let probs = [0.9, 0.2, 0.95, 0.05];
    let affines = affines_filled(4, IDENTITY);

    let mut detector = Detector::new().with_resize_params(two_by_two());
    let detections = detector
        .detect(
            dims,
            ProbabilityGrid::new(&probs, 2, 2).unwrap(),
            AffineGrid::new(&affines, 2, 2).unwrap(),
        )
        .unwrap();
    assert_eq!(confidences(&detections), vec![0.95]);
}

#[test]
fn separated_boxes_survive_default_threshold() {
    let dims = ImageDimensions::new(200, 200).unwrap();
    let probs = [0.9, 0.2, 0.95, 0.05];
    let affines = affines_filled(4, SMALL);

    let mut detector = Detector::new().with_resize_params(two_by_two());
    let detections = detector
        .detect(
            dims,
            ProbabilityGrid::new(&probs, 2, 2).unwrap(),
            AffineGrid::new(&affines, 2, 2).unwrap(),
        )
        .unwrap();
    assert_eq!(confidences(&detections), vec![0.95, 0.9]);
    let first = detections[0].rect();
    let second = detections[1].rect();
    assert!(first.top >= second.bottom);
}

#[test]
fn all_cells_below_threshold_is_not_an_error() {
    let dims = ImageDimensions::new(640, 480).unwrap();
    let mut detector = Detector::new();
    let size = detector.target_size(dims).unwrap();
    let (rows, cols) = (size.grid_rows(), size.grid_cols());
    assert_eq!((rows, cols), (24, 32));

    let probs = vec![0.49f32; rows * cols];
    let affines = affines_filled(rows * cols, IDENTITY);
    let detections = detector
        .detect(
            dims,
            ProbabilityGrid::new(&probs, rows, cols).unwrap(),
            AffineGrid::new(&affines, rows, cols).unwrap(),
        )
        .unwrap();
    assert!(detections.is_empty());
}

#[test]
fn grid_shape_must_match_target_size() {
    let dims = ImageDimensions::new(640, 480).unwrap();
    let probs = vec![0.0f32; 4];
    let affines = affines_filled(4, IDENTITY);
    let mut detector = Detector::new();
    let err = detector
        .detect(
            dims,
            ProbabilityGrid::new(&probs, 2, 2).unwrap(),
            AffineGrid::new(&affines, 2, 2).unwrap(),
        )
        .err()
        .unwrap();
    assert_eq!(
        err,
        PlateBoxError::GridMismatch {
            context: "grid vs network input size",
            expected_rows: 24,
            expected_cols: 32,
            rows: 2,
            cols: 2,
        }
    );
}

#[test]
fn raw_tensor_path_matches_split_grids() {
    let dims = ImageDimensions::new(640, 480).unwrap();
    let (rows, cols) = (24, 32);
    let hits = [(3, 4, 0.8), (10, 20, 0.97), (20, 5, 0.6)];
    let tensor = make_tensor(rows, cols, &hits, SMALL);

    let mut probs = vec![0.0f32; rows * cols];
    for &(row, col, prob) in &hits {
        probs[row * cols + col] = prob;
    }
    let affines = affines_filled(rows * cols, SMALL);

    let mut detector = Detector::new();
    let from_tensor = detector.detect_tensor(dims, &tensor).unwrap();
    let from_grids = detector
        .detect(
            dims,
            ProbabilityGrid::new(&probs, rows, cols).unwrap(),
            AffineGrid::new(&affines, rows, cols).unwrap(),
        )
        .unwrap();

    assert_eq!(from_tensor, from_grids);
    assert_eq!(confidences(&from_tensor), vec![0.97, 0.8, 0.6]);
}

#[test]
fn detector_reuses_buffers_across_sizes() {
    let mut detector = Detector::new();

    let vga = ImageDimensions::new(640, 480).unwrap();
    let tensor = make_tensor(24, 32, &[(1, 1, 0.9)], SMALL);
    assert_eq!(detector.detect_tensor(vga, &tensor).unwrap().len(), 1);

    let square = ImageDimensions::new(300, 300).unwrap();
    let tensor = make_tensor(18, 18, &[(2, 2, 0.7), (15, 15, 0.8)], SMALL);
    let detections = detector.detect_tensor(square, &tensor).unwrap();
    assert_eq!(confidences(&detections), vec![0.8, 0.7]);

    let err = detector.detect_tensor(vga, &tensor).err().unwrap();
    assert_eq!(
        err,
        PlateBoxError::BufferLengthMismatch {
            context: "output tensor",
            needed: 24 * 32 * OUTPUT_CHANNELS,
            got: 18 * 18 * OUTPUT_CHANNELS,
        }
    );
}

#[test]
fn grids_written_in_place_match_tensor_path() {
    let square = ImageDimensions::new(300, 300).unwrap();
    let tensor = make_tensor(18, 18, &[(2, 2, 0.7), (15, 15, 0.8)], SMALL);
    let expected = Detector::new().detect_tensor(square, &tensor).unwrap();

    let mut detector = Detector::new();
    let grids = detector.prepare_grids(square).unwrap();
    assert_eq!((grids.rows(), grids.cols()), (18, 18));
    let (probs, affines) = grids.as_mut_slices();
    for (cell, (prob, params)) in tensor
        .chunks_exact(OUTPUT_CHANNELS)
        .zip(probs.iter_mut().zip(affines.chunks_exact_mut(6)))
    {
        *prob = cell[0];
        params.copy_from_slice(&cell[2..]);
    }
    let detections = detector.detect_prepared(square).unwrap();
    assert_eq!(detections, expected);

    let vga = ImageDimensions::new(640, 480).unwrap();
    let err = detector.detect_prepared(vga).unwrap_err();
    assert_eq!(
        err,
        PlateBoxError::GridMismatch {
            context: "grid vs network input size",
            expected_rows: 24,
            expected_cols: 32,
            rows: 18,
            cols: 18,
        }
    );
}

#[test]
fn max_detections_and_min_area_trim_output() {
    let dims = ImageDimensions::new(640, 480).unwrap();
    let hits = [(2, 2, 0.9), (8, 8, 0.85), (14, 14, 0.8), (20, 20, 0.75)];
    let tensor = make_tensor(24, 32, &hits, SMALL);

    let mut limited = Detector::new().with_config(DetectorConfig {
        max_detections: Some(2),
        ..DetectorConfig::default()
    });
    let detections = limited.detect_tensor(dims, &tensor).unwrap();
    assert_eq!(confidences(&detections), vec![0.9, 0.85]);

    // SMALL boxes span 0.775 cells: 15.5 x 15.5 px at 640x480 with a 32x24 grid.
    let area = detections[0].rect().area();
    assert!((area - 15.5 * 15.5).abs() < 1e-2);
    let mut filtered = Detector::new().with_config(DetectorConfig {
        min_area: area + 1.0,
        ..DetectorConfig::default()
    });
    assert!(filtered.detect_tensor(dims, &tensor).unwrap().is_empty());
}

#[test]
fn invalid_config_is_reported_before_decoding() {
    let dims = ImageDimensions::new(640, 480).unwrap();
    let tensor = make_tensor(24, 32, &[], SMALL);
    let mut detector = Detector::new().with_config(DetectorConfig {
        iou_threshold: f32::NAN,
        ..DetectorConfig::default()
    });
    let err = detector.detect_tensor(dims, &tensor).err().unwrap();
    assert_eq!(
        err,
        PlateBoxError::InvalidConfig {
            reason: "iou_threshold must be finite",
        }
    );
}

#[test]
fn crop_detections_map_back_to_frame() {
    let crop = ImageDimensions::new(640, 480).unwrap();
    let tensor = make_tensor(24, 32, &[(12, 16, 0.9)], SMALL);
    let mut detector = Detector::new();
    let detections = detector.detect_tensor(crop, &tensor).unwrap();
    let in_crop = detections[0].rect();

    let in_frame = detections[0].offset_by(100.0, 40.0);
    assert_eq!(in_frame.id(), "0");
    assert!((in_frame.rect().left - (in_crop.left + 100.0)).abs() < 1e-4);
    assert!((in_frame.rect().bottom - (in_crop.bottom + 40.0)).abs() < 1e-4);
    assert!(in_frame.is_plausible());
}
