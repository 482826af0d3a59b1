use crate::remote::domain::function_invoker::FunctionInvoker;
use crate::remote::domain::RemoteError;
use crate::remote::infrastructure::http_response::{
    apply_signature, endpoint_url, read_body, untimed_client,
};
use crate::remote::infrastructure::request_signer::RequestSigner;

/// Invokes functions through the Lambda REST path
/// `POST <endpoint>/2015-03-31/functions/<name>/invocations`.
///
/// The call is synchronous and carries no client-side timeout. Requests are
/// SigV4-signed when a [`RequestSigner`] is attached.
pub struct HttpFunctionInvoker {
    endpoint: String,
    client: reqwest::blocking::Client,
    signer: Option<RequestSigner>,
}

impl HttpFunctionInvoker {
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

    pub fn invocation_url(&self, function: &str) -> String {
        endpoint_url(
            &self.endpoint,
            &format!("2015-03-31/functions/{function}/invocations"),
        )
    }
}

impl FunctionInvoker for HttpFunctionInvoker {
    fn invoke(&self, function: &str, payload: &serde_json::Value) -> Result<Vec<u8>, RemoteError> {
        let url = self.invocation_url(function);
        log::debug!("Invoking {function} at {url}");
        let body = payload.to_string();
        let request = apply_signature(
            self.client.post(&url),
            self.signer.as_ref(),
            "POST",
            &url,
            body.as_bytes(),
        )?;
        let response = request
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|source| RemoteError::Http {
                url: url.clone(),
                source,
            })?;
        read_body(&url, response)
    }
}
