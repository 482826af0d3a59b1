use std::time::SystemTime;

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    sign, PayloadChecksumKind, PercentEncodingMode, SignableBody, SignableRequest,
    SigningParams, SigningSettings, UriPathNormalizationMode,
};
use aws_sigv4::sign::v4;

use crate::remote::domain::RemoteError;

pub const S3_SERVICE: &str = "s3";
pub const LAMBDA_SERVICE: &str = "lambda";

/// AWS Signature Version 4 for one service in one region.
///
/// Produces the headers to attach to an outgoing request; the HTTP client
/// itself stays a plain blocking `reqwest` client.
#[derive(Clone, Debug)]
pub struct RequestSigner {
    credentials: Credentials,
    region: String,
    service: String,
}

impl RequestSigner {
    pub fn new(
        credentials: Credentials,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Signing headers for a `method` request to `url` carrying `body`.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        body: &[u8],
    ) -> Result<Vec<(String, String)>, RemoteError> {
        self.sign_at(method, url, body, SystemTime::now())
    }

    fn sign_at(
        &self,
        method: &str,
        url: &str,
        body: &[u8],
        time: SystemTime,
    ) -> Result<Vec<(String, String)>, RemoteError> {
        let signing_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            RemoteError::Signing {
                url: url.to_string(),
                source,
            }
        };

        let mut settings = SigningSettings::default();
        if self.service == S3_SERVICE {
            // S3 wants the payload hash header and keys signed as sent.
            settings.payload_checksum_kind = PayloadChecksumKind::XAmzSha256;
            settings.percent_encoding_mode = PercentEncodingMode::Single;
            settings.uri_path_normalization_mode = UriPathNormalizationMode::Disabled;
        }

        let identity = self.credentials.clone().into();
        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(&self.service)
            .time(time)
            .settings(settings)
            .build()
            .map_err(|e| signing_error(Box::new(e)))?
            .into();

        let request =
            SignableRequest::new(method, url, std::iter::empty(), SignableBody::Bytes(body))
                .map_err(|e| signing_error(Box::new(e)))?;
        let (instructions, _signature) = sign(request, &params)
            .map_err(|e| signing_error(Box::new(e)))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}
