//! Python bindings for the platebox post-processing library.
//!
//! Exposes input sizing and the detector pipeline to Python via PyO3. Grids
//! are passed as contiguous `float32` numpy arrays.

use numpy::{PyReadonlyArray2, PyReadonlyArray3, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use platebox::lowlevel::{AFFINE_PARAMS, OUTPUT_CHANNELS};
use platebox::{
    AffineGrid, Detection as RustDetection, Detector as RustDetector,
    DetectorConfig as RustDetectorConfig, ImageDimensions, PlateBoxError, ProbabilityGrid,
};

/// Convert a PlateBoxError to a Python exception.
fn to_py_err(err: PlateBoxError) -> PyErr {
    match err {
        PlateBoxError::InvalidConfig { .. } => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn dims(width: u32, height: u32) -> PyResult<ImageDimensions> {
    ImageDimensions::new(width, height).map_err(to_py_err)
}

/// A detected plate in source-image pixel coordinates.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub label: String,
    #[pyo3(get)]
    pub confidence: f32,
    #[pyo3(get)]
    pub left: f32,
    #[pyo3(get)]
    pub top: f32,
    #[pyo3(get)]
    pub right: f32,
    #[pyo3(get)]
    pub bottom: f32,
}

#[pymethods]
impl Detection {
    /// Box area in pixels.
    #[getter]
    fn area(&self) -> f32 {
        (self.right - self.left) * (self.bottom - self.top)
    }

    fn __repr__(&self) -> String {
        format!(
            "Detection(id='{}', confidence={:.4}, box=({:.1}, {:.1}, {:.1}, {:.1}))",
            self.id, self.confidence, self.left, self.top, self.right, self.bottom
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(d: RustDetection) -> Self {
        let rect = d.rect();
        Self {
            id: d.id().to_string(),
            label: d.label().to_string(),
            confidence: d.confidence(),
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        }
    }
}

/// Detector thresholds and output limits.
#[pyclass]
#[derive(Clone)]
pub struct DetectorConfig {
    inner: RustDetectorConfig,
}

#[pymethods]
impl DetectorConfig {
    /// Create a new DetectorConfig.
    ///
    /// Args:
    ///     prob_threshold: Minimum cell probability, inclusive (default: 0.5)
    ///     iou_threshold: Suppression IoU threshold (default: 0.1)
    ///     max_detections: Keep at most this many detections (default: None)
    ///     min_area: Drop detections below this pixel area (default: 0.0)
    ///     parallel: Decode rows in parallel (default: False)
    #[new]
    #[pyo3(signature = (
        prob_threshold = 0.5,
        iou_threshold = 0.1,
        max_detections = None,
        min_area = 0.0,
        parallel = false
    ))]
    fn new(
        prob_threshold: f32,
        iou_threshold: f32,
        max_detections: Option<usize>,
        min_area: f32,
        parallel: bool,
    ) -> PyResult<Self> {
        let inner = RustDetectorConfig {
            prob_threshold,
            iou_threshold,
            max_detections,
            min_area,
            parallel,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Validate the configuration.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "DetectorConfig(prob_threshold={}, iou_threshold={}, max_detections={:?}, min_area={}, parallel={})",
            self.inner.prob_threshold,
            self.inner.iou_threshold,
            self.inner.max_detections,
            self.inner.min_area,
            self.inner.parallel
        )
    }
}

/// License-plate detector post-processing.
///
/// Keeps scratch buffers between calls; use one instance per thread.
#[pyclass]
pub struct Detector {
    inner: RustDetector,
}

#[pymethods]
impl Detector {
    /// Create a detector.
    ///
    /// Args:
    ///     config: DetectorConfig (default: DetectorConfig())
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<DetectorConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        cfg.validate().map_err(to_py_err)?;
        Ok(Self {
            inner: RustDetector::new().with_config(cfg),
        })
    }

    /// Network input size `(width, height)` for a source image.
    fn target_size(&self, width: u32, height: u32) -> PyResult<(u32, u32)> {
        let size = self.inner.target_size(dims(width, height)?).map_err(to_py_err)?;
        Ok((size.width(), size.height()))
    }

    /// Decode and suppress split output grids.
    ///
    /// Args:
    ///     probs: 2D float32 array (rows x cols) of plate probabilities
    ///     affines: 3D float32 array (rows x cols x 6) of affine parameters
    ///     width: Source image width
    ///     height: Source image height
    ///
    /// Returns:
    ///     List of Detection objects, most confident first
    fn detect(
        &mut self,
        probs: PyReadonlyArray2<'_, f32>,
        affines: PyReadonlyArray3<'_, f32>,
        width: u32,
        height: u32,
    ) -> PyResult<Vec<Detection>> {
        let prob_shape = probs.shape();
        let (rows, cols) = (prob_shape[0], prob_shape[1]);
        let affine_shape = affines.shape();
        if affine_shape[2] != AFFINE_PARAMS {
            return Err(PyValueError::new_err(format!(
                "affines must have {AFFINE_PARAMS} values per cell"
            )));
        }
        let prob_view = ProbabilityGrid::new(probs.as_slice()?, rows, cols).map_err(to_py_err)?;
        let affine_view = AffineGrid::new(affines.as_slice()?, affine_shape[0], affine_shape[1])
            .map_err(to_py_err)?;

        let detections = self
            .inner
            .detect(dims(width, height)?, prob_view, affine_view)
            .map_err(to_py_err)?;
        Ok(detections.into_iter().map(Detection::from).collect())
    }

    /// Decode and suppress a raw output tensor.
    ///
    /// Args:
    ///     tensor: 3D float32 array (rows x cols x 8)
    ///     width: Source image width
    ///     height: Source image height
    fn detect_tensor(
        &mut self,
        tensor: PyReadonlyArray3<'_, f32>,
        width: u32,
        height: u32,
    ) -> PyResult<Vec<Detection>> {
        if tensor.shape()[2] != OUTPUT_CHANNELS {
            return Err(PyValueError::new_err(format!(
                "tensor must have {OUTPUT_CHANNELS} channels"
            )));
        }
        let detections = self
            .inner
            .detect_tensor(dims(width, height)?, tensor.as_slice()?)
            .map_err(to_py_err)?;
        Ok(detections.into_iter().map(Detection::from).collect())
    }

    fn __repr__(&self) -> String {
        "Detector()".to_string()
    }
}

/// Network input size `(width, height)` for a `width x height` source image.
#[pyfunction]
fn compute_target_size(width: u32, height: u32) -> PyResult<(u32, u32)> {
    let size = platebox::compute_target_size(width, height).map_err(to_py_err)?;
    Ok((size.width(), size.height()))
}

/// Python module for platebox.
#[pymodule]
fn _platebox(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<DetectorConfig>()?;
    m.add_class::<Detector>()?;
    m.add_function(wrap_pyfunction!(compute_target_size, m)?)?;
    Ok(())
}
