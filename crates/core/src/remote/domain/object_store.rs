use crate::remote::domain::RemoteError;

/// Bucket/key blob storage holding evaluation images and result artifacts.
pub trait ObjectStore: Send {
    /// Downloads the whole object.
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError>;

    /// Uploads `body`, replacing any existing object at the key.
    fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), RemoteError>;
}

/// Joins key segments with `/` the way a filesystem path join would,
/// without doubling separators or leading with one for an empty prefix.
pub fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
