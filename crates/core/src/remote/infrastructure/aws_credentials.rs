use std::env;
use std::fs;
use std::path::PathBuf;

use aws_credential_types::Credentials;

use crate::remote::domain::RemoteError;

const PROVIDER_NAME: &str = "wider-eval";
const DEFAULT_PROFILE: &str = "default";

/// Finds AWS credentials the way the AWS CLI does for static keys.
///
/// An explicitly named profile is read from the shared credentials file.
/// Otherwise `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` (plus optional
/// `AWS_SESSION_TOKEN`) win, then the `AWS_PROFILE` (or `default`) profile.
pub fn resolve_credentials(profile: Option<&str>) -> Result<Credentials, RemoteError> {
    if profile.is_none() {
        if let Some(credentials) = credentials_from_vars(|name| env::var(name).ok()) {
            log::debug!("Using AWS credentials from environment");
            return Ok(credentials);
        }
    }

    let profile = profile
        .map(str::to_string)
        .or_else(|| env::var("AWS_PROFILE").ok())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
    let path = shared_credentials_path().ok_or_else(|| {
        RemoteError::Credentials("no environment keys and no home directory".to_string())
    })?;
    let text = fs::read_to_string(&path).map_err(|e| {
        RemoteError::Credentials(format!(
            "no environment keys and cannot read {}: {e}",
            path.display()
        ))
    })?;

    let credentials = credentials_from_profile(&text, &profile).ok_or_else(|| {
        RemoteError::Credentials(format!(
            "profile [{profile}] in {} has no access key pair",
            path.display()
        ))
    })?;
    log::debug!("Using AWS credentials from profile {profile}");
    Ok(credentials)
}

fn shared_credentials_path() -> Option<PathBuf> {
    env::var_os("AWS_SHARED_CREDENTIALS_FILE")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join("credentials")))
}

fn credentials_from_vars(lookup: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let access_key = non_empty("AWS_ACCESS_KEY_ID")?;
    let secret_key = non_empty("AWS_SECRET_ACCESS_KEY")?;
    Some(Credentials::new(
        access_key,
        secret_key,
        non_empty("AWS_SESSION_TOKEN"),
        None,
        PROVIDER_NAME,
    ))
}

/// Reads one `[profile]` section of an INI-style credentials file.
fn credentials_from_profile(text: &str, profile: &str) -> Option<Credentials> {
    let mut in_section = false;
    let mut access_key = None;
    let mut secret_key = None;
    let mut session_token = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == profile;
            continue;
        }
        if !in_section {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = Some(value.trim().to_string());
        match key.trim() {
            "aws_access_key_id" => access_key = value,
            "aws_secret_access_key" => secret_key = value,
            "aws_session_token" => session_token = value,
            _ => {}
        }
    }

    Some(Credentials::new(
        access_key?,
        secret_key?,
        session_token,
        None,
        PROVIDER_NAME,
    ))
}
