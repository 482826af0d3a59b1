use std::collections::HashMap;
use std::time::Duration;

use crate::shared::detection::Detection;

/// Detector output and measured latency for one image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageResult {
    pub id: String,
    pub detections: Vec<Detection>,
    pub runtime: Duration,
}

/// Results of one run, in the order the image source produced them.
///
/// Boxes and runtimes are stored together, so both views always cover the
/// same identifiers. Recording an identifier twice replaces the earlier
/// values but keeps its original position.
#[derive(Clone, Debug, Default)]
pub struct EvaluationOutput {
    results: Vec<ImageResult>,
    index: HashMap<String, usize>,
}

impl EvaluationOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: String, detections: Vec<Detection>, runtime: Duration) {
        match self.index.get(&id) {
            Some(&pos) => {
                let slot = &mut self.results[pos];
                slot.detections = detections;
                slot.runtime = runtime;
            }
            None => {
                self.index.insert(id.clone(), self.results.len());
                self.results.push(ImageResult {
                    id,
                    detections,
                    runtime,
                });
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ImageResult> {
        self.index.get(id).map(|&pos| &self.results[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageResult> {
        self.results.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.id.as_str())
    }

    /// Identifier → boxes, in run order.
    pub fn boxes(&self) -> impl Iterator<Item = (&str, &[Detection])> {
        self.results
            .iter()
            .map(|r| (r.id.as_str(), r.detections.as_slice()))
    }

    /// Identifier → measured latency, in run order.
    pub fn runtimes(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.results.iter().map(|r| (r.id.as_str(), r.runtime))
    }

    pub fn total_runtime(&self) -> Duration {
        self.results.iter().map(|r| r.runtime).sum()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
