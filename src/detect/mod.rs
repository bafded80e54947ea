//! Single-call detection pipeline.
//!
//! `Detector` runs sizing, decoding, sorting, suppression and pixel mapping
//! for one frame. It keeps its grid and candidate buffers between calls and
//! only reshapes them when the network input size changes.

use crate::candidate::nms::suppress_into;
use crate::candidate::sort::sort_candidates_desc;
use crate::decode::{decode_into, CandidateBox};
use crate::geometry::{compute_target_size_with, ImageDimensions, NetworkInputSize, ResizeParams};
use crate::grid::{check_input_size, check_same_shape, AffineGrid, GridBuffers, ProbabilityGrid};
use crate::trace::{frame_span, stage_count};
use crate::util::{PlateBoxError, PlateBoxResult};

mod detection;

pub use detection::{to_detections, Detection, PixelRect, MIN_PLAUSIBLE_AREA, PLATE_LABEL};

/// Detector thresholds and output limits.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Minimum cell probability (inclusive) for a cell to be decoded.
    pub prob_threshold: f32,
    /// Boxes overlapping a kept box by more than this IoU are dropped.
    pub iou_threshold: f32,
    /// Keep at most this many detections, if set.
    pub max_detections: Option<usize>,
    /// Drop detections whose pixel area is below this value.
    pub min_area: f32,
    /// Decode rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            prob_threshold: 0.5,
            iou_threshold: 0.1,
            max_detections: None,
            min_area: 0.0,
            parallel: false,
        }
    }
}

impl DetectorConfig {
    /// Validates thresholds and limits.
    pub fn validate(&self) -> PlateBoxResult<()> {
        if !self.prob_threshold.is_finite() {
            return Err(PlateBoxError::InvalidConfig {
                reason: "prob_threshold must be finite",
            });
        }
        if !self.iou_threshold.is_finite() {
            return Err(PlateBoxError::InvalidConfig {
                reason: "iou_threshold must be finite",
            });
        }
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(PlateBoxError::InvalidConfig {
                reason: "min_area must be finite and >= 0",
            });
        }
        if self.max_detections == Some(0) {
            return Err(PlateBoxError::InvalidConfig {
                reason: "max_detections must be >= 1 when set",
            });
        }
        Ok(())
    }
}

/// License-plate detector post-processing with reusable buffers.
#[derive(Debug, Default)]
pub struct Detector {
    cfg: DetectorConfig,
    resize: ResizeParams,
    grids: GridBuffers,
    candidates: Vec<CandidateBox>,
    kept: Vec<CandidateBox>,
}

impl Detector {
    /// Creates a detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the detector configuration.
    pub fn with_config(mut self, cfg: DetectorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Replaces the sizing parameters.
    pub fn with_resize_params(mut self, params: ResizeParams) -> Self {
        self.resize = params;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    /// Returns the active sizing parameters.
    pub fn resize_params(&self) -> &ResizeParams {
        &self.resize
    }

    /// Computes the network input size for a source image.
    pub fn target_size(&self, dims: ImageDimensions) -> PlateBoxResult<NetworkInputSize> {
        compute_target_size_with(dims, &self.resize)
    }

    /// Decodes and suppresses the grids produced for an image of `dims`.
    ///
    /// The grids must have the shape derived from [`Detector::target_size`].
    pub fn detect(
        &mut self,
        dims: ImageDimensions,
        probs: ProbabilityGrid<'_>,
        affines: AffineGrid<'_>,
    ) -> PlateBoxResult<Vec<Detection>> {
        self.cfg.validate()?;
        let size = self.target_size(dims)?;
        check_same_shape(&probs, &affines)?;
        check_input_size(size, probs.rows(), probs.cols())?;
        run_pipeline(
            &self.cfg,
            dims,
            probs,
            affines,
            &mut self.candidates,
            &mut self.kept,
        )
    }

    /// Splits a raw `[rows, cols, 8]` output tensor and runs [`Detector::detect`].
    pub fn detect_tensor(
        &mut self,
        dims: ImageDimensions,
        tensor: &[f32],
    ) -> PlateBoxResult<Vec<Detection>> {
        self.cfg.validate()?;
        let size = self.target_size(dims)?;
        self.grids.fill_from_tensor(size, tensor)?;

        self.run_on_grids(dims)
    }

    /// Shapes the internal grids for an image of `dims` and returns them.
    ///
    /// Inference can write its output straight into
    /// [`GridBuffers::as_mut_slices`] before calling
    /// [`Detector::detect_prepared`]. The contents are zeroed only when the
    /// input size changes; otherwise they hold the previous frame.
    pub fn prepare_grids(&mut self, dims: ImageDimensions) -> PlateBoxResult<&mut GridBuffers> {
        let size = self.target_size(dims)?;
        if !self.grids.matches(size) {
            self.grids.resize(size);
        }
        Ok(&mut self.grids)
    }

    /// Runs the pipeline on the grids filled through [`Detector::prepare_grids`].
    pub fn detect_prepared(&mut self, dims: ImageDimensions) -> PlateBoxResult<Vec<Detection>> {
        self.cfg.validate()?;
        let size = self.target_size(dims)?;
        self.grids.check_size(size)?;
        self.run_on_grids(dims)
    }

    fn run_on_grids(&mut self, dims: ImageDimensions) -> PlateBoxResult<Vec<Detection>> {
        run_pipeline(
            &self.cfg,
            dims,
            self.grids.probs(),
            self.grids.affines(),
            &mut self.candidates,
            &mut self.kept,
        )
    }
}

fn run_pipeline(
    cfg: &DetectorConfig,
    dims: ImageDimensions,
    probs: ProbabilityGrid<'_>,
    affines: AffineGrid<'_>,
    candidates: &mut Vec<CandidateBox>,
    kept: &mut Vec<CandidateBox>,
) -> PlateBoxResult<Vec<Detection>> {
    let _span = frame_span!(probs.rows(), probs.cols());
    decode_dispatch(cfg, probs, affines, candidates)?;
    stage_count!("decoded", candidates.len());

    sort_candidates_desc(candidates);
    suppress_into(candidates, cfg.iou_threshold, kept);
    stage_count!("suppressed", kept.len());

    if cfg.min_area > 0.0 {
        kept.retain(|candidate| {
            PixelRect::from_normalized(candidate, dims).area() >= cfg.min_area
        });
    }
    if let Some(limit) = cfg.max_detections {
        kept.truncate(limit);
    }

    stage_count!("kept", kept.len());
    Ok(to_detections(kept, dims))
}

#[cfg(feature = "rayon")]
fn decode_dispatch(
    cfg: &DetectorConfig,
    probs: ProbabilityGrid<'_>,
    affines: AffineGrid<'_>,
    out: &mut Vec<CandidateBox>,
) -> PlateBoxResult<()> {
    if cfg.parallel {
        crate::decode::rayon::decode_par_into(probs, affines, cfg.prob_threshold, out)
    } else {
        decode_into(probs, affines, cfg.prob_threshold, out)
    }
}

#[cfg(not(feature = "rayon"))]
fn decode_dispatch(
    cfg: &DetectorConfig,
    probs: ProbabilityGrid<'_>,
    affines: AffineGrid<'_>,
    out: &mut Vec<CandidateBox>,
) -> PlateBoxResult<()> {
    decode_into(probs, affines, cfg.prob_threshold, out)
}
