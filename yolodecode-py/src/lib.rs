//! Python bindings for yolodecode.
//!
//! Arrays are taken in the layout most runtimes hand back after squeezing
//! the batch axis: `(N, C)` for detection outputs and `(H, W, P)` for
//! prototype masks. Both must be C-contiguous `float32`.

use numpy::{
    PyArray1, PyArray2, PyArrayMethods, PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArray3,
    PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::BTreeMap;

use yolodecode::{
    ArgmaxPolicy, DecodeConfig, DecodeError, Decoder as RustDecoder, Detection as RustDetection,
    ImageSize, InstanceMask, Mode, TensorView,
};

fn to_py_err(err: DecodeError) -> PyErr {
    match err {
        DecodeError::InvalidConfig(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

/// One surviving detection.
#[pyclass]
pub struct Detection {
    /// Box corners `(x1, y1, x2, y2)` in model-input pixels.
    #[pyo3(get)]
    pub bbox: (f32, f32, f32, f32),
    #[pyo3(get)]
    pub score: f32,
    /// Class id; `None` for pose outputs.
    #[pyo3(get)]
    pub class_id: Option<usize>,
    /// `(x, y, visibility)` triples for pose outputs.
    #[pyo3(get)]
    pub keypoints: Option<Vec<(f32, f32, f32)>>,
    mask: Option<InstanceMask>,
}

#[pymethods]
impl Detection {
    /// Boolean `(height, width)` mask at image resolution, if any.
    #[getter]
    fn mask<'py>(&self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyArray2<bool>>>> {
        let Some(mask) = self.mask.as_ref() else {
            return Ok(None);
        };
        let flat = PyArray1::from_slice(py, mask.as_slice());
        Ok(Some(flat.reshape([mask.height(), mask.width()])?))
    }

    fn __repr__(&self) -> String {
        let (x1, y1, x2, y2) = self.bbox;
        format!(
            "Detection(bbox=({x1:.1}, {y1:.1}, {x2:.1}, {y2:.1}), score={:.4}, class_id={:?})",
            self.score, self.class_id
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(d: RustDetection) -> Self {
        Self {
            bbox: (d.bbox.x1, d.bbox.y1, d.bbox.x2, d.bbox.y2),
            score: d.score,
            class_id: d.class_id,
            keypoints: d
                .keypoints
                .map(|kps| kps.into_iter().map(|kp| (kp.x, kp.y, kp.visibility)).collect()),
            mask: d.mask,
        }
    }
}

fn parse_mode(mode: &str, class_count: Option<usize>) -> PyResult<Mode> {
    match mode.to_lowercase().as_str() {
        "classification" => Ok(Mode::Classification),
        "detection" => Ok(Mode::Detection),
        "pose" => Ok(Mode::Pose),
        "segmentation" => Ok(Mode::Segmentation { class_count }),
        _ => Err(PyValueError::new_err(
            "mode must be 'classification', 'detection', 'pose' or 'segmentation'",
        )),
    }
}

fn parse_argmax(argmax: &str) -> PyResult<ArgmaxPolicy> {
    match argmax.to_lowercase().as_str() {
        "zero_floor" => Ok(ArgmaxPolicy::ZeroFloor),
        "unbounded" => Ok(ArgmaxPolicy::Unbounded),
        _ => Err(PyValueError::new_err(
            "argmax must be 'zero_floor' or 'unbounded'",
        )),
    }
}

fn slot_view<'a>(output: &'a PyReadonlyArray2<'_, f32>) -> PyResult<TensorView<'a>> {
    let shape = output.shape();
    let (slots, channels) = (shape[0], shape[1]);
    TensorView::new(output.as_slice()?, [1, 1, slots, channels]).map_err(to_py_err)
}

fn proto_view<'a>(protos: &'a PyReadonlyArray3<'_, f32>) -> PyResult<TensorView<'a>> {
    let shape = protos.shape();
    TensorView::new(protos.as_slice()?, [1, shape[0], shape[1], shape[2]]).map_err(to_py_err)
}

/// Post-processor for YOLO-style outputs.
#[pyclass]
pub struct Decoder {
    inner: RustDecoder,
}

#[pymethods]
impl Decoder {
    /// Create a decoder.
    ///
    /// Args:
    ///     mode: "classification", "detection", "pose" or "segmentation"
    ///     score_threshold: Minimum selected score (default: 0.5)
    ///     iou_threshold: Suppression overlap threshold (default: 0.75)
    ///     mask_threshold: Mask activation threshold (default: 0.5)
    ///     max_candidates: Candidates entering suppression (default: 3000)
    ///     argmax: "zero_floor" or "unbounded" (default: "zero_floor")
    ///     input_size: Model input (width, height) (default: (640, 640))
    ///     class_count: Segmentation class count, derived when None
    ///     parallel: Use the rayon pool (default: False)
    #[new]
    #[pyo3(signature = (
        mode = "detection",
        score_threshold = 0.5,
        iou_threshold = 0.75,
        mask_threshold = 0.5,
        max_candidates = 3000,
        argmax = "zero_floor",
        input_size = (640, 640),
        class_count = None,
        parallel = false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        mode: &str,
        score_threshold: f32,
        iou_threshold: f32,
        mask_threshold: f32,
        max_candidates: usize,
        argmax: &str,
        input_size: (usize, usize),
        class_count: Option<usize>,
        parallel: bool,
    ) -> PyResult<Self> {
        let cfg = DecodeConfig {
            mode: parse_mode(mode, class_count)?,
            score_threshold,
            iou_threshold,
            mask_threshold,
            max_candidates,
            policy: parse_argmax(argmax)?,
            input_size: ImageSize::new(input_size.0, input_size.1),
            parallel,
        };
        let inner = RustDecoder::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Per-class scores at or above the threshold.
    ///
    /// Args:
    ///     scores: 1D float32 array of class scores
    fn classify(&self, scores: PyReadonlyArray1<'_, f32>) -> PyResult<BTreeMap<usize, f32>> {
        let data = scores.as_slice()?;
        let view = TensorView::new(data, [1, 1, 1, data.len()]).map_err(to_py_err)?;
        self.inner.classify(view).map_err(to_py_err)
    }

    /// Decode and suppress a detection output.
    ///
    /// Args:
    ///     output: 2D float32 array (slots x channels)
    fn detect(&self, output: PyReadonlyArray2<'_, f32>) -> PyResult<Vec<Detection>> {
        let view = slot_view(&output)?;
        let dets = self.inner.detect(view).map_err(to_py_err)?;
        Ok(dets.into_iter().map(Detection::from).collect())
    }

    /// Decode and suppress a pose output.
    ///
    /// Args:
    ///     output: 2D float32 array (slots x channels)
    fn detect_pose(&self, output: PyReadonlyArray2<'_, f32>) -> PyResult<Vec<Detection>> {
        let view = slot_view(&output)?;
        let dets = self.inner.detect_pose(view).map_err(to_py_err)?;
        Ok(dets.into_iter().map(Detection::from).collect())
    }

    /// Decode, suppress and reconstruct masks.
    ///
    /// Args:
    ///     output: 2D float32 array (slots x channels)
    ///     protos: 3D float32 array (height x width x prototypes)
    ///     image_size: Original image (width, height)
    fn segment(
        &self,
        output: PyReadonlyArray2<'_, f32>,
        protos: PyReadonlyArray3<'_, f32>,
        image_size: (usize, usize),
    ) -> PyResult<Vec<Detection>> {
        let view = slot_view(&output)?;
        let protos = proto_view(&protos)?;
        let image = ImageSize::new(image_size.0, image_size.1);
        let dets = self
            .inner
            .segment(view, protos, image)
            .map_err(to_py_err)?;
        Ok(dets.into_iter().map(Detection::from).collect())
    }

    fn __repr__(&self) -> String {
        let cfg = self.inner.config();
        format!(
            "Decoder(mode={:?}, score_threshold={}, iou_threshold={}, parallel={})",
            cfg.mode, cfg.score_threshold, cfg.iou_threshold, cfg.parallel
        )
    }
}

/// Python module for yolodecode.
#[pymodule]
fn _yolodecode(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<Decoder>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
