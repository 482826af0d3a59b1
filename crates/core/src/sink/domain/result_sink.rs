use std::time::Duration;

use crate::evaluation::evaluation_output::EvaluationOutput;
use crate::shared::error::EvalError;

/// Final destination of a completed run's results.
pub trait ResultSink: Send {
    fn submit(&mut self, output: &EvaluationOutput) -> Result<SinkReport, EvalError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum SinkReport {
    Verified(VerificationReport),
    Uploaded(UploadReceipt),
}

/// Outcome of checking a run against local ground truth.
#[derive(Clone, Debug, PartialEq)]
pub struct VerificationReport {
    /// Number of ground-truth images.
    pub images: usize,
    /// Summed detector time over the ground-truth images.
    pub total_runtime: Duration,
    /// `images / total_runtime`; infinite when no time was measured.
    pub images_per_second: f64,
}

/// Where the results artifact went and what the scorer said about it.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadReceipt {
    pub bucket: String,
    pub key: String,
    /// Raw scoring response, when a scoring function was called.
    pub scoring_response: Option<String>,
}
