use ndarray::Array2;

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;

/// The participant-supplied face detector under evaluation.
///
/// `detect` receives one BGR frame and returns one row per face:
/// `[left, top, width, height, confidence]` in pixels, as `f32`. A frame
/// with no faces yields an array with zero rows.
///
/// Only `detect` is timed. Any setup (model loading, warm-up) belongs in
/// the constructor, which the evaluation runs once before the first image.
/// Implementations may keep inference state between calls, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Array2<f32>, BoxError>;
}
