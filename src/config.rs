//! Configuration for the HTTP client and paginated browsing
//!
//! Loaded from YAML:
//!
//! ```yaml
//! base_url: https://api.github.com
//! token: ghp_...
//! http:
//!   timeout_seconds: 30
//!   user_agent: opera-cli
//!   backoff:
//!     type: exponential
//!     initial_ms: 100
//!     max_ms: 60000
//!   headers:
//!     Accept: application/vnd.github+json
//! pagination:
//!   first_page_value: "1"
//! ```

use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use crate::pagination::PaginationSettings;
use crate::types::{BackoffType, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable consulted when no token is configured
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperaConfig {
    /// Base URL for API requests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access token sent as `Authorization: token <t>`
    #[serde(default)]
    pub token: Option<String>,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpSection,

    /// Pagination parameter naming
    #[serde(default)]
    pub pagination: PaginationSettings,
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for OperaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            http: HttpSection::default(),
            pagination: PaginationSettings::default(),
        }
    }
}

impl OperaConfig {
    /// Token from the config, else from `GITHUB_TOKEN`
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .none_if_empty()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok().none_if_empty())
    }

    /// HTTP client configuration for this config
    pub fn client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .backoff(
                self.http.backoff.backoff_type,
                Duration::from_millis(self.http.backoff.initial_ms),
                Duration::from_millis(self.http.backoff.max_ms),
            );

        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }
        for (key, value) in &self.http.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }
}

// ============================================================================
// HTTP Section
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSection {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Retry backoff
    #[serde(default)]
    pub backoff: BackoffSection,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: None,
            backoff: BackoffSection::default(),
            headers: HashMap::new(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Retry backoff settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffSection {
    /// Backoff type
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_ms: u64,
}

impl Default for BackoffSection {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::default(),
            initial_ms: default_initial_backoff(),
            max_ms: default_max_backoff(),
        }
    }
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    60_000
}

// ============================================================================
// Loading
// ============================================================================

/// Load configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<OperaConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_config_from_str(&content)
}

/// Load configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<OperaConfig> {
    if yaml.trim().is_empty() {
        return Ok(OperaConfig::default());
    }
    let config: OperaConfig = serde_yaml::from_str(yaml)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &OperaConfig) -> Result<()> {
    url::Url::parse(&config.base_url)?;

    if config.http.timeout_seconds == 0 {
        return Err(Error::config("http.timeout_seconds must be positive"));
    }
    if config.http.backoff.initial_ms > config.http.backoff.max_ms {
        return Err(Error::config(
            "http.backoff.initial_ms cannot exceed http.backoff.max_ms",
        ));
    }

    let pagination = &config.pagination;
    if pagination.page_parameter_name.is_empty() || pagination.first_page_value.is_empty() {
        return Err(Error::config(
            "pagination.page_parameter_name and pagination.first_page_value cannot be empty",
        ));
    }
    Ok(())
}
