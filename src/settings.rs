use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default filename looked up within the OS config directory.
const CONFIG_FILENAME: &str = "config.json";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FUSION_CONFIG";

/// Lower bound for the SSE keep-alive interval.
const MIN_KEEP_ALIVE_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {var}: {value:?}")]
    Override { var: &'static str, value: String },
}

/// Complete server configuration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// OAuth client secrets downloaded from the cloud console.
    pub credentials_file: PathBuf,
    /// Authorized-user token written after the consent flow.
    pub token_file: PathBuf,
    /// Ceiling for `list_google_docs` when the caller omits `max_results`.
    pub default_max_results: u32,
    pub sse_path: String,
    pub post_path: String,
    pub keep_alive_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9300,
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from("token.json"),
            default_max_results: 20,
            sse_path: "/sse".to_string(),
            post_path: "/message".to_string(),
            keep_alive_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load the config file (if any) and apply `FUSION_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = explicit.clone().or_else(default_config_path);
        Self::load_with(path.as_deref(), explicit.is_some(), |var| {
            std::env::var(var).ok()
        })
    }

    /// `required` makes a missing file an error instead of falling back to defaults.
    pub fn load_with<F>(path: Option<&Path>, required: bool, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) if required || path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.apply_overrides(env)?;
        config.keep_alive_secs = config.keep_alive_secs.max(MIN_KEEP_ALIVE_SECS);
        config.default_max_results = config.default_max_results.max(1);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = env("FUSION_HOST") {
            self.host = host;
        }
        if let Some(port) = parse_override(&env, "FUSION_PORT")? {
            self.port = port;
        }
        if let Some(path) = env("FUSION_CREDENTIALS_FILE") {
            self.credentials_file = PathBuf::from(path);
        }
        if let Some(path) = env("FUSION_TOKEN_FILE") {
            self.token_file = PathBuf::from(path);
        }
        if let Some(max) = parse_override(&env, "FUSION_DEFAULT_MAX_RESULTS")? {
            self.default_max_results = max;
        }
        if let Some(path) = env("FUSION_SSE_PATH") {
            self.sse_path = path;
        }
        if let Some(path) = env("FUSION_POST_PATH") {
            self.post_path = path;
        }
        if let Some(secs) = parse_override(&env, "FUSION_KEEP_ALIVE_SECS")? {
            self.keep_alive_secs = secs;
        }
        Ok(())
    }
}

fn parse_override<T, F>(env: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match env(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Override { var, value }),
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "fusion", "Fusion")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}
