use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no job id: pass --job-id, set JOB_ID, or add job_id to the config file")]
    MissingJobId,
    #[error("{0}")]
    Invalid(String),
}

/// Where the evaluation images come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Newline-delimited file list on local disk.
    Local,
    /// Newline-delimited object list in the object store.
    Catalog,
    /// Object list returned by the image-list function.
    Service,
}

impl std::str::FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(SourceKind::Local),
            "catalog" => Ok(SourceKind::Catalog),
            "service" => Ok(SourceKind::Service),
            other => Err(ConfigError::Invalid(format!(
                "source must be one of: local, catalog, service, got '{other}'"
            ))),
        }
    }
}

/// Packaging of the uploaded results artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Bare `<job_id>.json`.
    None,
    /// `<job_id>.zip` holding one deflated `wider_output.json`, the layout
    /// the scoring function reads.
    Zip,
    /// `<job_id>.json.gz`.
    Gzip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub object_store_endpoint: String,
    pub function_endpoint: String,
    /// Region both endpoints are signed for.
    pub region: String,
    /// SigV4-sign remote requests. Turn off only for endpoints that accept
    /// anonymous calls, such as a local S3-compatible server.
    pub sign_requests: bool,
    /// Named profile in the shared credentials file. When unset, the
    /// environment keys win, then `AWS_PROFILE` or `default`.
    pub profile: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            object_store_endpoint: DEFAULT_OBJECT_STORE_ENDPOINT.to_string(),
            function_endpoint: DEFAULT_FUNCTION_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            sign_requests: true,
            profile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub image_list: PathBuf,
    pub image_dir: PathBuf,
    pub ground_truth: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            image_list: PathBuf::from(LOCAL_IMAGE_LIST),
            image_dir: PathBuf::from(LOCAL_IMAGE_DIR),
            ground_truth: PathBuf::from(LOCAL_GROUND_TRUTH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub bucket: String,
    pub list_key: String,
    pub image_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bucket: UPLOAD_BUCKET.to_string(),
            list_key: CATALOG_LIST_KEY.to_string(),
            image_prefix: CATALOG_IMAGE_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub function: String,
    pub user_id: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            function: IMAGE_LIST_FUNCTION.to_string(),
            user_id: IMAGE_LIST_USER_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub bucket: String,
    pub prefix: String,
    pub compression: Compression,
    /// Local directory the artifact is written to before upload.
    pub staging_dir: PathBuf,
    /// Function invoked after upload; `None` skips remote scoring.
    pub scoring_function: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            bucket: UPLOAD_BUCKET.to_string(),
            prefix: UPLOAD_PREFIX.to_string(),
            compression: Compression::Zip,
            staging_dir: PathBuf::from("."),
            scoring_function: Some(SCORING_FUNCTION.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub model_path: PathBuf,
    pub confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(SAMPLE_MODEL_PATH),
            confidence: SAMPLE_CONFIDENCE,
        }
    }
}

/// Settings for one evaluation run, passed explicitly to each component.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub job_id: Option<String>,
    pub source: SourceKind,
    pub max_images: Option<usize>,
    pub progress_interval: usize,
    pub remote: RemoteConfig,
    pub local: LocalConfig,
    pub catalog: CatalogConfig,
    pub listing: ListingConfig,
    pub upload: UploadConfig,
    pub detector: DetectorConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            job_id: None,
            source: SourceKind::Service,
            max_images: None,
            progress_interval: PROGRESS_INTERVAL,
            remote: RemoteConfig::default(),
            local: LocalConfig::default(),
            catalog: CatalogConfig::default(),
            listing: ListingConfig::default(),
            upload: UploadConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl EvalConfig {
    /// Loads `explicit` if given; otherwise `eval_config.json` in the
    /// working directory when present; otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_fallback(explicit, Path::new(CONFIG_FILE_NAME))
    }

    fn load_with_fallback(explicit: Option<&Path>, fallback: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if fallback.exists() => Self::from_file(fallback),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress_interval must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detector.confidence) {
            return Err(ConfigError::Invalid(format!(
                "detector confidence must be between 0.0 and 1.0, got {}",
                self.detector.confidence
            )));
        }
        if self.remote.sign_requests && self.remote.region.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "remote region must not be empty when signing requests".to_string(),
            ));
        }
        if self.upload.bucket.is_empty() {
            return Err(ConfigError::Invalid("upload bucket must not be empty".to_string()));
        }
        Ok(())
    }

    /// Job id precedence: command line, then `JOB_ID`, then the config file.
    pub fn resolve_job_id(&self, cli: Option<&str>) -> Result<String, ConfigError> {
        self.resolve_job_id_from(cli, std::env::var(JOB_ID_ENV).ok())
    }

    fn resolve_job_id_from(
        &self,
        cli: Option<&str>,
        env: Option<String>,
    ) -> Result<String, ConfigError> {
        [cli.map(str::to_string), env, self.job_id.clone()]
            .into_iter()
            .flatten()
            .find(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingJobId)
    }
}
