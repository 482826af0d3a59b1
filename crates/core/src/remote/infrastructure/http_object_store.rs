use reqwest::StatusCode;

use crate::remote::domain::object_store::{join_key, ObjectStore};
use crate::remote::domain::RemoteError;
use crate::remote::infrastructure::http_response::{
    apply_signature, endpoint_url, read_body, untimed_client,
};
use crate::remote::infrastructure::request_signer::RequestSigner;

/// S3-compatible object store reached with path-style addressing:
/// `<endpoint>/<bucket>/<key>`.
///
/// With a [`RequestSigner`] every request carries SigV4 headers; without
/// one, requests go out unsigned (public buckets or a local test server).
pub struct HttpObjectStore {
    endpoint: String,
    client: reqwest::blocking::Client,
    signer: Option<RequestSigner>,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            client: untimed_client(endpoint)?,
            signer: None,
        })
    }

    pub fn with_signer(mut self, signer: RequestSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        endpoint_url(&self.endpoint, &join_key(bucket, key))
    }
}

impl ObjectStore for HttpObjectStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError> {
        let url = self.object_url(bucket, key);
        let request =
            apply_signature(self.client.get(&url), self.signer.as_ref(), "GET", &url, b"")?;
        let response = request
            .send()
            .map_err(|source| RemoteError::Http {
                url: url.clone(),
                source,
            })?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        read_body(&url, response)
    }

    fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), RemoteError> {
        let url = self.object_url(bucket, key);
        let request =
            apply_signature(self.client.put(&url), self.signer.as_ref(), "PUT", &url, &body)?;
        let response = request
            .body(body)
            .send()
            .map_err(|source| RemoteError::Http {
                url: url.clone(),
                source,
            })?;
        read_body(&url, response)?;
        Ok(())
    }
}
