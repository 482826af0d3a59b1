use std::time::Duration;

use reqwest::blocking::RequestBuilder;

use crate::remote::domain::RemoteError;
use crate::remote::infrastructure::request_signer::RequestSigner;

/// Blocking client with no request timeout: remote calls wait as long as
/// the service takes.
pub(crate) fn untimed_client(endpoint: &str) -> Result<reqwest::blocking::Client, RemoteError> {
    reqwest::blocking::Client::builder()
        .timeout(None::<Duration>)
        .build()
        .map_err(|source| RemoteError::Http {
            url: endpoint.to_string(),
            source,
        })
}

/// Reads the full body of a successful response, turning any other status
/// into [`RemoteError::Status`] carrying the server's message.
pub(crate) fn read_body(
    url: &str,
    response: reqwest::blocking::Response,
) -> Result<Vec<u8>, RemoteError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(RemoteError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().map_err(|source| RemoteError::Http {
        url: url.to_string(),
        source,
    })?;
    Ok(bytes.to_vec())
}

/// Adds SigV4 headers for `body` when a signer is configured.
pub(crate) fn apply_signature(
    builder: RequestBuilder,
    signer: Option<&RequestSigner>,
    method: &str,
    url: &str,
    body: &[u8],
) -> Result<RequestBuilder, RemoteError> {
    let Some(signer) = signer else {
        return Ok(builder);
    };
    Ok(signer
        .sign(method, url, body)?
        .into_iter()
        .fold(builder, |builder, (name, value)| builder.header(name, value)))
}

pub(crate) fn endpoint_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Serves exactly one HTTP request on a loopback port, answering with
/// `status_line` and `body`, and hands back the raw request text.
#[cfg(test)]
pub(crate) fn capture_one_request(
    status_line: &'static str,
    body: &'static str,
) -> (String, std::sync::mpsc::Receiver<String>) {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        let reply = format!(
            "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(reply.as_bytes()).unwrap();
        stream.flush().unwrap();
        let _ = tx.send(String::from_utf8_lossy(&raw).into_owned());
    });

    (endpoint, rx)
}
