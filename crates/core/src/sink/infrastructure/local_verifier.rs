use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::evaluation::evaluation_output::EvaluationOutput;
use crate::shared::error::{BoxError, EvalError};
use crate::sink::domain::result_sink::{ResultSink, SinkReport, VerificationReport};

/// Identifier → reference boxes (`[left, top, width, height, ...]`).
pub type GroundTruth = BTreeMap<String, Vec<Vec<f64>>>;

/// Sanity check for local runs: every ground-truth image must have been
/// processed; boxes are logged side by side for a human to eyeball and the
/// images-per-second figure is reported. No accuracy score is computed.
pub struct LocalVerifier {
    ground_truth: GroundTruth,
}

impl LocalVerifier {
    pub fn new(ground_truth: GroundTruth) -> Self {
        Self { ground_truth }
    }

    pub fn from_file(path: &Path) -> Result<Self, EvalError> {
        let gt_error = |source: BoxError| EvalError::GroundTruth {
            path: path.to_path_buf(),
            source,
        };
        let json = fs::read_to_string(path).map_err(|e| gt_error(Box::new(e)))?;
        let ground_truth: GroundTruth =
            serde_json::from_str(&json).map_err(|e| gt_error(Box::new(e)))?;
        Ok(Self::new(ground_truth))
    }

    pub fn verify(&self, output: &EvaluationOutput) -> Result<VerificationReport, EvalError> {
        if let Some(missing) = self.ground_truth.keys().find(|id| !output.contains(id)) {
            log::error!("Ground truth image {missing} has no detector output");
            return Err(EvalError::MissingGroundTruth {
                id: missing.clone(),
            });
        }

        let mut total_runtime = Duration::ZERO;
        for (id, expected) in &self.ground_truth {
            let Some(result) = output.get(id) else {
                continue;
            };
            let predicted: Vec<_> = result.detections.iter().map(|d| d.to_row()).collect();
            log::info!("{id}\n  ground truth: {expected:?}\n  predicted:    {predicted:?}");
            total_runtime += result.runtime;
        }

        let images = self.ground_truth.len();
        let secs = total_runtime.as_secs_f64();
        let images_per_second = match (images, secs > 0.0) {
            (0, _) => 0.0,
            (_, true) => images as f64 / secs,
            (_, false) => f64::INFINITY,
        };
        log::info!(
            "Verified {images} images, {secs:.3}s total detector time, {images_per_second:.2} images/s"
        );

        Ok(VerificationReport {
            images,
            total_runtime,
            images_per_second,
        })
    }
}

impl ResultSink for LocalVerifier {
    fn submit(&mut self, output: &EvaluationOutput) -> Result<SinkReport, EvalError> {
        self.verify(output).map(SinkReport::Verified)
    }
}
