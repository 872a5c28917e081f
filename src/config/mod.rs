//! Configuration for a prune run
//!
//! `PruneConfig` is assembled once before any network call and is read-only
//! afterwards. Layers, lowest precedence first:
//!
//! 1. Hardcoded defaults
//! 2. TOML file (`--config`, `./group-prune.toml`, or the user config dir)
//! 3. Environment variables (`PRIVATE_TOKEN`, `LOG_LEVEL`, `GROUP_PRUNE_*`)
//! 4. Command line flags (applied by the binary)

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub mod loader;

pub use loader::ConfigLoader;

pub const DEFAULT_API_URL: &str = "https://gitlab.com/api/v4";
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Valid log levels for configuration validation.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Get the per-user configuration directory
pub fn get_user_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "group-prune", "group-prune")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneConfig {
    /// Base URL of the REST API, including the version segment
    pub api_url: String,

    /// Private token sent as `PRIVATE-TOKEN` on every request
    pub private_token: Option<String>,

    /// Page size for list endpoints
    pub per_page: u32,

    /// Usernames never removed from any group
    pub whitelist_members: Vec<String>,

    /// Group names or full paths never offered for cleanup
    pub whitelist_groups: Vec<String>,

    pub log_level: Option<String>,

    /// Upper bound on simultaneous in-flight API requests
    pub max_concurrent_requests: usize,

    pub request_timeout_secs: u64,

    /// Exit non-zero when any group fetch or member removal failed
    pub fail_on_errors: bool,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            private_token: None,
            per_page: DEFAULT_PER_PAGE,
            whitelist_members: Vec::new(),
            whitelist_groups: Vec::new(),
            log_level: Some("info".to_string()),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            fail_on_errors: false,
        }
    }
}

impl PruneConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check every field; all problems are reported together
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.per_page == 0 {
            problems.push("per_page must be at least 1".to_string());
        }
        if self.max_concurrent_requests == 0 {
            problems.push("max_concurrent_requests must be at least 1".to_string());
        }
        if self.request_timeout_secs == 0 {
            problems.push("request_timeout_secs must be at least 1".to_string());
        }
        if let Err(e) = Url::parse(&self.api_url) {
            problems.push(format!("api_url '{}' is not a valid URL: {e}", self.api_url));
        }
        if let Some(level) = &self.log_level {
            if !VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                problems.push(format!(
                    "log_level '{level}' must be one of {}",
                    VALID_LOG_LEVELS.join(", ")
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(problems.join("; ")))
        }
    }

    /// The token, or a fatal configuration error when none is set
    pub fn require_token(&self) -> Result<&str> {
        self.private_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("private token required for execution".to_string()))
    }

    pub fn has_token(&self) -> bool {
        self.require_token().is_ok()
    }

    pub fn api_base(&self) -> Result<Url> {
        Ok(Url::parse(self.api_url.trim_end_matches('/'))?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn get_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}
