//! Blocking HTTPS clients for the Google Workspace REST APIs.
//!
//! Every client shares one [`GoogleClient`], which owns the `ureq` agent and
//! attaches a bearer token from the configured [`AccessTokenProvider`] to each
//! request. Provider failures are mapped onto [`DomainError`] here so adapters
//! never see transport-specific error types.

mod auth;
mod docs;
mod drive;
mod gmail;
mod keep;
mod mime;
mod sheets;

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::domain::DomainError;

pub use auth::{AccessTokenProvider, AuthorizedUserToken, ClientSecrets, FileTokenSource};
pub use docs::GoogleDocsClient;
pub use drive::GoogleDriveClient;
pub use gmail::GmailClient;
pub use keep::GoogleKeepClient;
pub use sheets::GoogleSheetsClient;

/// Timeout applied to every provider round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated request helper shared by every API client.
pub struct GoogleClient {
    agent: ureq::Agent,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GoogleClient {
    pub fn new(tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            agent: build_agent(),
            tokens,
        }
    }

    fn request(
        &self,
        method: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<ureq::Request, DomainError> {
        let token = self.tokens.access_token()?;
        debug!(target: "fusion::google", %method, %url, "provider request");

        let request = self
            .agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {token}"));
        Ok(query
            .iter()
            .fold(request, |request, (key, value)| request.query(key, value)))
    }

    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DomainError> {
        let response = self
            .request("GET", url, query)?
            .call()
            .map_err(handle_http_error)?;
        read_json(response)
    }

    pub fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        query: &[(&str, &str)],
        body: &impl Serialize,
    ) -> Result<T, DomainError> {
        let response = self
            .request(method, url, query)?
            .send_json(body)
            .map_err(handle_http_error)?;
        read_json(response)
    }

    pub fn delete(&self, url: &str) -> Result<(), DomainError> {
        self.request("DELETE", url, &[])?
            .call()
            .map_err(handle_http_error)?;
        Ok(())
    }
}

pub(crate) fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build()
}

/// Percent-encode a single path segment (IDs, A1 ranges).
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn read_json<T: DeserializeOwned>(response: ureq::Response) -> Result<T, DomainError> {
    response
        .into_json::<T>()
        .map_err(|err| DomainError::provider(format!("failed to decode provider response: {err}")))
}

/// Standard Google API error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Convert HTTP errors to domain errors.
pub fn handle_http_error(error: ureq::Error) -> DomainError {
    match error {
        ureq::Error::Status(code, response) => {
            let detail = response
                .into_json::<ErrorEnvelope>()
                .ok()
                .map(|envelope| match envelope.error.status {
                    Some(status) => format!("{status}: {}", envelope.error.message),
                    None => envelope.error.message,
                })
                .unwrap_or_else(|| format!("HTTP {code}"));
            classify_status(code, detail)
        }
        ureq::Error::Transport(transport) => DomainError::transport(transport.to_string()),
    }
}

fn classify_status(code: u16, detail: String) -> DomainError {
    match code {
        404 => DomainError::not_found(detail),
        401 | 403 => DomainError::unauthorized(detail),
        429 => DomainError::rate_limited(detail),
        _ => DomainError::provider(format!("HTTP {code}: {detail}")),
    }
}
