use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::DomainError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for provider calls.
pub trait AccessTokenProvider: Send + Sync {
    fn access_token(&self) -> Result<String, DomainError>;
}

/// Authorized-user token file, compatible with the JSON written by Google's auth libraries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizedUserToken {
    #[serde(rename = "token", alias = "access_token", default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl AuthorizedUserToken {
    /// A token without an expiry is trusted until the provider rejects it.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let has_token = self
            .access_token
            .as_deref()
            .is_some_and(|token| !token.is_empty());
        has_token
            && self
                .expiry
                .map_or(true, |expiry| expiry - Duration::seconds(EXPIRY_MARGIN_SECS) > now)
    }
}

/// OAuth client identity taken from a downloaded client-secrets file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    #[serde(default)]
    installed: Option<ClientSecrets>,
    #[serde(default)]
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let raw = fs::read(path).map_err(|err| {
            DomainError::unauthorized(format!(
                "cannot read credentials file {}: {err}",
                path.display()
            ))
        })?;
        Self::from_slice(&raw).map_err(|err| {
            DomainError::unauthorized(format!(
                "invalid credentials file {}: {err}",
                path.display()
            ))
        })
    }

    fn from_slice(raw: &[u8]) -> Result<Self, String> {
        let file: ClientSecretsFile =
            serde_json::from_slice(raw).map_err(|err| err.to_string())?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "expected an 'installed' or 'web' client section".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Reads the cached user token from disk and refreshes it when it nears expiry.
pub struct FileTokenSource {
    token_path: PathBuf,
    credentials_path: PathBuf,
    agent: ureq::Agent,
    state: Mutex<Option<AuthorizedUserToken>>,
}

impl FileTokenSource {
    pub fn new(token_path: impl Into<PathBuf>, credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            token_path: token_path.into(),
            credentials_path: credentials_path.into(),
            agent: super::build_agent(),
            state: Mutex::new(None),
        }
    }

    fn read_token(&self) -> Result<AuthorizedUserToken, DomainError> {
        let raw = fs::read(&self.token_path).map_err(|err| {
            DomainError::unauthorized(format!(
                "no usable token at {} ({err}); complete the OAuth consent flow and save the authorized-user token there",
                self.token_path.display()
            ))
        })?;
        serde_json::from_slice(&raw).map_err(|err| {
            DomainError::unauthorized(format!(
                "invalid token file {}: {err}",
                self.token_path.display()
            ))
        })
    }

    fn refresh(&self, token: &mut AuthorizedUserToken) -> Result<(), DomainError> {
        let refresh_token = token.refresh_token.clone().ok_or_else(|| {
            DomainError::unauthorized("access token expired and no refresh token is stored")
        })?;

        let secrets = match (&token.client_id, &token.client_secret) {
            (Some(id), Some(secret)) => ClientSecrets {
                client_id: id.clone(),
                client_secret: secret.clone(),
                token_uri: token.token_uri.clone(),
            },
            _ => ClientSecrets::from_file(&self.credentials_path)?,
        };
        let token_uri = secrets
            .token_uri
            .clone()
            .or_else(|| token.token_uri.clone())
            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string());

        let response: RefreshResponse = self
            .agent
            .post(&token_uri)
            .send_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
            ])
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => DomainError::unauthorized(format!(
                    "token refresh rejected with HTTP {code}; re-run the OAuth consent flow"
                )),
                ureq::Error::Transport(transport) => DomainError::transport(transport.to_string()),
            })?
            .into_json()
            .map_err(|err| DomainError::unauthorized(format!("invalid refresh response: {err}")))?;

        token.access_token = Some(response.access_token);
        token.expiry = response
            .expires_in
            .map(|seconds| Utc::now() + Duration::seconds(seconds));
        if let Some(rotated) = response.refresh_token {
            token.refresh_token = Some(rotated);
        }
        info!(target: "fusion::google", "refreshed OAuth access token");

        self.persist(token);
        Ok(())
    }

    fn persist(&self, token: &AuthorizedUserToken) {
        let written = serde_json::to_vec_pretty(token)
            .map_err(|err| err.to_string())
            .and_then(|payload| fs::write(&self.token_path, payload).map_err(|err| err.to_string()));
        if let Err(err) = written {
            warn!(
                target: "fusion::google",
                path = %self.token_path.display(),
                error = %err,
                "failed to persist refreshed token"
            );
        }
    }
}

impl AccessTokenProvider for FileTokenSource {
    fn access_token(&self) -> Result<String, DomainError> {
        let mut guard = self.state.lock();
        if guard.is_none() {
            *guard = Some(self.read_token()?);
        }
        let Some(token) = guard.as_mut() else {
            return Err(DomainError::unauthorized("token cache unavailable"));
        };

        if !token.is_fresh(Utc::now()) {
            self.refresh(token)?;
        }

        token
            .access_token
            .clone()
            .ok_or_else(|| DomainError::unauthorized("provider returned no access token"))
    }
}
