use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::remote::domain::object_store::ObjectStore;
use crate::remote::domain::RemoteError;

/// Object store backed by a local directory tree: `<root>/<bucket>/<key>`.
///
/// Lets a run read a mirrored image catalog or write its artifact without
/// network access.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key.trim_start_matches('/'))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> RemoteError {
    RemoteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError> {
        let path = self.object_path(bucket, key);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RemoteError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => io_error(&path, e),
        })
    }

    fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), RemoteError> {
        let path = self.object_path(bucket, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        fs::write(&path, body).map_err(|e| io_error(&path, e))
    }
}
