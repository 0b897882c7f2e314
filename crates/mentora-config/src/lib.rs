//! Client configuration for the Mentora platform SDK.
//!
//! A small YAML file plus environment overrides:
//!
//! ```yaml
//! api:
//!   base-url: https://api.mentora.example
//!   timeout-secs: 10
//!
//! auth:
//!   token-file: ~/.config/mentora/access-token
//!   auth-paths:
//!     - /auth/
//! ```
//!
//! The default location is `<config dir>/mentora/client.yaml`. Environment
//! variables (`MENTORA_BASE_URL`, `MENTORA_TIMEOUT_SECS`, `MENTORA_TOKEN_FILE`)
//! override whatever the file says, so a shell session can point an existing
//! setup at a staging server without editing anything.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

mod error;

pub use error::{ConfigError, Result};

/// Default config filename within the mentora config directory.
const CLIENT_CONFIG_FILE: &str = "client.yaml";

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "MENTORA_BASE_URL";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "MENTORA_TIMEOUT_SECS";
/// Environment variable overriding the token file path.
pub const ENV_TOKEN_FILE: &str = "MENTORA_TOKEN_FILE";

// ─────────────────────────────────────────────────────────────────────────────
// Client Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root client configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// API connection settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Server root the client joins `api/v1/...` paths onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthConfig {
    /// File the access token is persisted to. `None` keeps the token in
    /// memory only.
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// Path substrings whose response bodies use the server's snake_case
    /// convention and are camelized by the client.
    #[serde(default = "default_auth_paths")]
    pub auth_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_file: None,
            auth_paths: default_auth_paths(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_auth_paths() -> Vec<String> {
    vec!["/auth/".to_string()]
}

impl ClientConfig {
    /// Parse from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Load from a specific file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load from the default location, falling back to defaults when the file
    /// does not exist. Environment overrides are applied either way.
    pub fn load_default() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::default(),
        };
        config.overlay_env()?;
        Ok(config)
    }

    /// Default config file path: `<config dir>/mentora/client.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mentora").join(CLIENT_CONFIG_FILE))
    }

    /// Apply overrides from the process environment.
    pub fn overlay_env(&mut self) -> Result<()> {
        self.overlay_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn overlay_env_with(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(base_url) = get(ENV_BASE_URL) {
            self.api.base_url = base_url;
        }

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            self.api.timeout_secs = raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: "api.timeout-secs".to_string(),
                value: raw,
            })?;
        }

        if let Some(token_file) = get(ENV_TOKEN_FILE) {
            self.auth.token_file = Some(PathBuf::from(token_file));
        }

        Ok(())
    }
}
