//! API key verification against the CodeAlive backend.

use crate::error::{InstallerError, Result};
use serde::Deserialize;
use std::time::Duration;

pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(15);

const ALIVE_PATH: &str = "/api/datasources/alive";

/// Result of a verification round trip that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub valid: bool,
    pub datasource_count: usize,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AliveResponse {
    DataSources(Vec<serde_json::Value>),
    #[allow(dead_code)]
    Other(serde_json::Value),
}

/// Check `api_key` by listing the data sources it can see.
///
/// HTTP-level answers come back as `Ok`; transport problems are
/// `Err(Timeout)` or `Err(Network)` so the caller can offer to continue.
pub fn verify_api_key(api_key: &str, base_url: &str) -> Result<Verification> {
    let client = reqwest::blocking::Client::builder()
        .timeout(VERIFY_TIMEOUT)
        .build()
        .map_err(|e| InstallerError::Network(format!("Failed to create HTTP client: {}", e)))?;
    verify_with_client(&client, api_key, base_url)
}

fn verify_with_client(
    client: &reqwest::blocking::Client,
    api_key: &str,
    base_url: &str,
) -> Result<Verification> {
    let base = base_url.trim_end_matches('/');
    let url = format!("{}{}", base, ALIVE_PATH);

    tracing::debug!(%url, "verifying api key");
    let response = client
        .get(&url)
        .bearer_auth(api_key)
        .send()
        .map_err(|e| transport_error(&e, base))?;

    let status = response.status().as_u16();
    let body = response.text().map_err(|e| transport_error(&e, base))?;
    tracing::debug!(status, "verification response");
    Ok(interpret(status, &body))
}

/// Map an HTTP status and body to a verification verdict.
pub fn interpret(status: u16, body: &str) -> Verification {
    match status {
        200..=299 => {
            let count = match serde_json::from_str::<AliveResponse>(body) {
                Ok(AliveResponse::DataSources(sources)) => sources.len(),
                _ => 0,
            };
            let noun = if count == 1 { "data source" } else { "data sources" };
            Verification {
                valid: true,
                datasource_count: count,
                message: format!("API key verified ({} {})", count, noun),
            }
        }
        401 => Verification {
            valid: false,
            datasource_count: 0,
            message: "API key is invalid or expired".to_string(),
        },
        other => Verification {
            valid: false,
            datasource_count: 0,
            message: format!("Verification failed with HTTP {}", other),
        },
    }
}

fn transport_error(err: &reqwest::Error, base: &str) -> InstallerError {
    tracing::debug!(error = %err, "verification request failed");
    if err.is_timeout() {
        InstallerError::Timeout("Verification request timed out".to_string())
    } else {
        InstallerError::Network(format!("Cannot connect to {}", base))
    }
}
