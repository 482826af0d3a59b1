use std::time::{Duration, Instant};

use crate::detection::domain::face_detector::FaceDetector;
use crate::evaluation::eval_logger::EvalLogger;
use crate::evaluation::evaluation_output::EvaluationOutput;
use crate::shared::detection::{detections_from_array, Detection};
use crate::shared::error::{BoxError, EvalError};
use crate::shared::frame::ImageRecord;
use crate::sink::domain::result_sink::{ResultSink, SinkReport};
use crate::source::domain::image_source::ImageSource;

/// Runtime evaluation: source → detect (timed) → collect → sink.
///
/// Strictly sequential. The first failure of any kind ends the run and
/// nothing reaches the sink.
pub struct EvaluateRuntimeUseCase {
    source: Box<dyn ImageSource>,
    sink: Box<dyn ResultSink>,
    logger: Box<dyn EvalLogger>,
}

impl EvaluateRuntimeUseCase {
    pub fn new(
        source: Box<dyn ImageSource>,
        sink: Box<dyn ResultSink>,
        logger: Box<dyn EvalLogger>,
    ) -> Self {
        Self {
            source,
            sink,
            logger,
        }
    }

    /// Builds the detector once, then runs it over every image the source
    /// produces. Only the `detect` call is timed.
    pub fn collect<F>(&mut self, build_detector: F) -> Result<EvaluationOutput, EvalError>
    where
        F: FnOnce() -> Result<Box<dyn FaceDetector>, BoxError>,
    {
        self.logger.info("Initializing face detector.");
        let mut detector = build_detector().map_err(|e| {
            log::error!("Face detector initialization failed: {e}");
            EvalError::DetectorInit(e)
        })?;
        self.logger.info("Detector initialized.");

        self.logger.info("Starting runtime evaluation");
        let mut output = EvaluationOutput::new();
        for (index, item) in self.source.images()?.enumerate() {
            let record = item.map_err(|err| {
                if let Some(id) = err.image_id() {
                    self.logger.image_failed(id, &err);
                }
                err
            })?;
            let (detections, runtime) =
                timed_detect(detector.as_mut(), &record).map_err(|err| {
                    self.logger.image_failed(&record.id, &err);
                    err
                })?;
            self.logger.image_done(&record.id, index + 1, runtime);
            output.record(record.id, detections, runtime);
        }

        self.logger.info(&format!("Processed {} images.", output.len()));
        Ok(output)
    }

    /// Collects a full run and hands it to the sink.
    pub fn execute<F>(&mut self, build_detector: F) -> Result<SinkReport, EvalError>
    where
        F: FnOnce() -> Result<Box<dyn FaceDetector>, BoxError>,
    {
        let output = self.collect(build_detector)?;
        self.logger.summary();
        self.sink.submit(&output)
    }
}

fn timed_detect(
    detector: &mut dyn FaceDetector,
    record: &ImageRecord,
) -> Result<(Vec<Detection>, Duration), EvalError> {
    let start = Instant::now();
    let raw = detector.detect(&record.frame);
    let runtime = start.elapsed();

    let raw = raw.map_err(|source| EvalError::Inference {
        id: record.id.clone(),
        source,
    })?;
    let detections = detections_from_array(&raw).map_err(|source| EvalError::InvalidOutput {
        id: record.id.clone(),
        source,
    })?;
    Ok((detections, runtime))
}
