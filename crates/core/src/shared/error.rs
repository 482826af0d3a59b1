use std::path::PathBuf;

use thiserror::Error;

use crate::remote::domain::RemoteError;
use crate::shared::config::ConfigError;
use crate::shared::detection::MalformedOutput;

/// Error type returned by detectors and other pluggable collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every way an evaluation run can fail.
///
/// All kinds are fatal: the run stops at the first error and nothing is
/// retried or partially persisted.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to initialize face detector: {0}")]
    DetectorInit(#[source] BoxError),
    #[error("failed to obtain image list: {0}")]
    Listing(#[source] BoxError),
    #[error("failed to fetch image {id}: {source}")]
    Fetch {
        id: String,
        #[source]
        source: BoxError,
    },
    #[error("failed to decode image {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: image::ImageError,
    },
    #[error("face detector failed on image {id}: {source}")]
    Inference {
        id: String,
        #[source]
        source: BoxError,
    },
    #[error("face detector returned malformed boxes for image {id}: {source}")]
    InvalidOutput {
        id: String,
        #[source]
        source: MalformedOutput,
    },
    #[error("failed to load ground truth from {path}: {source}")]
    GroundTruth {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("ground truth image {id} missing from detector output")]
    MissingGroundTruth { id: String },
    #[error("failed to write evaluation artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to upload {key} to bucket {bucket}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: RemoteError,
    },
    #[error("scoring call {function} failed: {source}")]
    Scoring {
        function: String,
        #[source]
        source: RemoteError,
    },
}

impl EvalError {
    /// The image the run stopped on, for per-image failures.
    pub fn image_id(&self) -> Option<&str> {
        match self {
            EvalError::Fetch { id, .. }
            | EvalError::Decode { id, .. }
            | EvalError::Inference { id, .. }
            | EvalError::InvalidOutput { id, .. }
            | EvalError::MissingGroundTruth { id } => Some(id),
            _ => None,
        }
    }
}
