use std::time::Duration;

use crate::shared::constants::PROGRESS_INTERVAL;
use crate::shared::error::EvalError;

/// Observer for evaluation-run events.
///
/// Keeps the evaluation loop independent of where progress goes (log
/// output, tests, a dashboard).
pub trait EvalLogger: Send {
    /// One image finished; `processed` counts images so far, this one included.
    fn image_done(&mut self, id: &str, processed: usize, runtime: Duration);

    /// Image `id` failed and the run stops with `error`.
    fn image_failed(&mut self, id: &str, error: &EvalError);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Logger that discards all events.
pub struct NullEvalLogger;

impl EvalLogger for NullEvalLogger {
    fn image_done(&mut self, _id: &str, _processed: usize, _runtime: Duration) {}
    fn image_failed(&mut self, _id: &str, _error: &EvalError) {}
    fn info(&mut self, _message: &str) {}
}

/// `log`-backed logger: every image's runtime at info level, a progress
/// line every `progress_interval` images, and runtime statistics at the end.
pub struct LogEvalLogger {
    progress_interval: usize,
    runtimes: Vec<f64>,
}

impl LogEvalLogger {
    pub fn new(progress_interval: usize) -> Self {
        Self {
            progress_interval: progress_interval.max(1),
            runtimes: Vec::new(),
        }
    }

    fn is_progress_point(&self, processed: usize) -> bool {
        processed > 0 && processed % self.progress_interval == 0
    }

    /// Returns the formatted summary string, or `None` if nothing ran.
    pub fn summary_string(&self) -> Option<String> {
        if self.runtimes.is_empty() {
            return None;
        }

        let count = self.runtimes.len();
        let total: f64 = self.runtimes.iter().sum();
        let avg = total / count as f64;
        let min = self.runtimes.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.runtimes.iter().copied().fold(0.0, f64::max);

        let mut lines = vec![
            format!("Runtime summary ({count} images, {total:.3}s in detector):"),
            format!("  avg {:8.2}ms", avg * 1000.0),
            format!("  min {:8.2}ms", min * 1000.0),
            format!("  max {:8.2}ms", max * 1000.0),
        ];
        if total > 0.0 {
            lines.push(format!("  Throughput: {:.2} images/s", count as f64 / total));
        }
        Some(lines.join("\n"))
    }
}

impl Default for LogEvalLogger {
    fn default() -> Self {
        Self::new(PROGRESS_INTERVAL)
    }
}

impl EvalLogger for LogEvalLogger {
    fn image_done(&mut self, id: &str, processed: usize, runtime: Duration) {
        let secs = runtime.as_secs_f64();
        self.runtimes.push(secs);
        log::info!("image {id} run time: {secs:.6}");
        if self.is_progress_point(processed) {
            log::info!("Finished {processed} images");
        }
    }

    fn image_failed(&mut self, id: &str, error: &EvalError) {
        log::error!("Image id failed: {id}: {error}");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullEvalLogger;
        logger.image_done("a", 1, Duration::from_millis(3));
        logger.image_failed("b", &EvalError::DetectorInit("boom".into()));
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_progress_points_every_interval() {
        let logger = LogEvalLogger::new(100);
        let points: Vec<usize> = (1..=350).filter(|&n| logger.is_progress_point(n)).collect();
        assert_eq!(points, vec![100, 200, 300]);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let logger = LogEvalLogger::new(0);
        assert_eq!(logger.progress_interval, 1);
    }

    #[test]
    fn test_default_interval_is_100() {
        assert_eq!(LogEvalLogger::default().progress_interval, 100);
    }

    #[test]
    fn test_runtimes_recorded() {
        let mut logger = LogEvalLogger::new(10);
        logger.image_done("a", 1, Duration::from_millis(20));
        logger.image_done("b", 2, Duration::from_millis(30));
        assert_eq!(logger.runtimes.len(), 2);
        assert!((logger.runtimes[1] - 0.030).abs() < 1e-9);
    }

    #[test]
    fn test_failed_image_not_counted_in_runtimes() {
        let mut logger = LogEvalLogger::new(10);
        logger.image_done("a", 1, Duration::from_millis(20));
        logger.image_failed("b", &EvalError::DetectorInit("boom".into()));
        assert_eq!(logger.runtimes.len(), 1);
    }

    #[test]
    fn test_summary_reports_stats() {
        let mut logger = LogEvalLogger::new(10);
        logger.image_done("a", 1, Duration::from_millis(10));
        logger.image_done("b", 2, Duration::from_millis(30));

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("2 images"));
        assert!(summary.contains("avg    20.00ms"));
        assert!(summary.contains("min    10.00ms"));
        assert!(summary.contains("max    30.00ms"));
        assert!(summary.contains("Throughput: 50.00 images/s"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogEvalLogger::new(10).summary_string().is_none());
    }
}
