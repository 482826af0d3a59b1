use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
    #[error("AWS credentials unavailable: {0}")]
    Credentials(String),
    #[error("failed to sign request to {url}: {source}")]
    Signing {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
