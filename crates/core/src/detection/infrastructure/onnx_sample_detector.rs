//! Sample face detector running an exported cascade through ONNX Runtime.
//!
//! The model takes the whole image as `[1, 3, H, W]` and emits rows of
//! `[x1, y1, x2, y2, score]` in pixel space, with proposal, refinement and
//! NMS already inside the graph. This adapter only normalizes input and
//! reshapes output.
use std::path::Path;

use ndarray::{Array2, Array4, ArrayViewD};

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::execution_provider::platform_execution_providers;
use crate::shared::detection::BOX_COLUMNS;
use crate::shared::error::BoxError;
use crate::shared::frame::Frame;

const PIXEL_MEAN: f32 = 127.5;
const PIXEL_SCALE: f32 = 0.0078125;

pub struct OnnxSampleDetector {
    session: ort::session::Session,
    confidence: f32,
}

impl OnnxSampleDetector {
    /// Load the model. Runs once, outside the timed region.
    pub fn new(model_path: &Path, confidence: f32) -> Result<Self, BoxError> {
        if !model_path.exists() {
            return Err(format!("model not found: {}", model_path.display()).into());
        }
        let session = ort::session::Session::builder()?
            .with_execution_providers(platform_execution_providers())?
            .commit_from_file(model_path)?;
        log::info!(
            "Loaded sample detector from {} (confidence {confidence})",
            model_path.display()
        );
        Ok(Self {
            session,
            confidence,
        })
    }
}

impl FaceDetector for OnnxSampleDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Array2<f32>, BoxError> {
        let input = ort::value::Tensor::from_array(preprocess(frame))?;
        let outputs = self.session.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err("sample detector model produced no outputs".into());
        }
        let raw = outputs[0].try_extract_array::<f32>()?;
        corners_to_boxes(raw, self.confidence)
    }
}

/// BGR `(H, W, 3)` bytes to a `[1, 3, H, W]` tensor scaled to about [-1, 1].
fn preprocess(frame: &Frame) -> Array4<f32> {
    let src = frame.as_ndarray();
    let (h, w) = (frame.height() as usize, frame.width() as usize);
    Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| {
        (src[[y, x, c]] as f32 - PIXEL_MEAN) * PIXEL_SCALE
    })
}

/// Keeps rows scoring at least `confidence` and rewrites corner boxes
/// `[x1, y1, x2, y2, s]` as `[left, top, width, height, s]`.
fn corners_to_boxes(raw: ArrayViewD<'_, f32>, confidence: f32) -> Result<Array2<f32>, BoxError> {
    if raw.len() == 0 {
        return Ok(Array2::zeros((0, BOX_COLUMNS)));
    }
    if raw.shape().last() != Some(&BOX_COLUMNS) {
        return Err(format!(
            "sample detector output must end in {BOX_COLUMNS} columns, got shape {:?}",
            raw.shape()
        )
        .into());
    }

    let values: Vec<f32> = raw.iter().copied().collect();
    let mut kept = Vec::with_capacity(values.len());
    for row in values.chunks_exact(BOX_COLUMNS) {
        let (x1, y1, x2, y2, score) = (row[0], row[1], row[2], row[3], row[4]);
        if score < confidence {
            continue;
        }
        kept.extend_from_slice(&[x1, y1, x2 - x1, y2 - y1, score]);
    }
    let rows = kept.len() / BOX_COLUMNS;
    Ok(Array2::from_shape_vec((rows, BOX_COLUMNS), kept)?)
}
