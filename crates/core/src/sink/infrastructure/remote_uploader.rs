use std::fs;
use std::path::PathBuf;

use crate::evaluation::evaluation_output::EvaluationOutput;
use crate::remote::domain::function_invoker::FunctionInvoker;
use crate::remote::domain::object_store::{join_key, ObjectStore};
use crate::shared::config::Compression;
use crate::shared::error::EvalError;
use crate::sink::domain::artifact::{artifact_file_name, encode_artifact};
use crate::sink::domain::result_sink::{ResultSink, SinkReport, UploadReceipt};

struct Scoring {
    invoker: Box<dyn FunctionInvoker>,
    function: String,
}

/// Ships a run to the evaluation backend: writes the results artifact
/// locally, uploads it to `<bucket>/<prefix>/<job_id>.zip` (or the name
/// the chosen compression gives it), and, when configured, calls the
/// scoring function and waits for its answer.
pub struct RemoteUploader {
    store: Box<dyn ObjectStore>,
    bucket: String,
    prefix: String,
    job_id: String,
    compression: Compression,
    staging_dir: PathBuf,
    scoring: Option<Scoring>,
}

impl RemoteUploader {
    pub fn new(
        store: Box<dyn ObjectStore>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            prefix: prefix.into(),
            job_id: job_id.into(),
            compression: Compression::Zip,
            staging_dir: PathBuf::from("."),
            scoring: None,
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_scoring(
        mut self,
        invoker: Box<dyn FunctionInvoker>,
        function: impl Into<String>,
    ) -> Self {
        self.scoring = Some(Scoring {
            invoker,
            function: function.into(),
        });
        self
    }

    fn stage(&self, output: &EvaluationOutput, file_name: &str) -> Result<Vec<u8>, EvalError> {
        let path = self.staging_dir.join(file_name);
        let artifact_error = |source| EvalError::Artifact {
            path: path.clone(),
            source,
        };
        let bytes = encode_artifact(output, self.compression).map_err(artifact_error)?;
        fs::create_dir_all(&self.staging_dir).map_err(artifact_error)?;
        fs::write(&path, &bytes).map_err(artifact_error)?;
        log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(bytes)
    }

    fn score(&self, key: &str) -> Result<Option<String>, EvalError> {
        let Some(scoring) = &self.scoring else {
            return Ok(None);
        };
        let payload = serde_json::json!({
            "s3_bucket": self.bucket,
            "s3_path": key,
        });
        let raw = scoring
            .invoker
            .invoke(&scoring.function, &payload)
            .map_err(|source| EvalError::Scoring {
                function: scoring.function.clone(),
                source,
            })?;
        let response = String::from_utf8_lossy(&raw).into_owned();
        log::info!("{response}");
        Ok(Some(response))
    }
}

impl ResultSink for RemoteUploader {
    fn submit(&mut self, output: &EvaluationOutput) -> Result<SinkReport, EvalError> {
        let file_name = artifact_file_name(&self.job_id, self.compression);
        let bytes = self.stage(output, &file_name)?;

        let key = join_key(&self.prefix, &file_name);
        self.store
            .put(&self.bucket, &key, bytes)
            .map_err(|source| EvalError::Upload {
                bucket: self.bucket.clone(),
                key: key.clone(),
                source,
            })?;
        log::info!("Uploaded results to {}/{key}", self.bucket);

        let scoring_response = self.score(&key)?;
        Ok(SinkReport::Uploaded(UploadReceipt {
            bucket: self.bucket.clone(),
            key,
            scoring_response,
        }))
    }
}
