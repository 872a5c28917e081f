use super::{get_user_config_dir, PruneConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "group-prune.toml";
pub const ENV_PREFIX: &str = "GROUP_PRUNE_";

/// Builds a `PruneConfig` from file and environment layers
pub struct ConfigLoader {
    config: PruneConfig,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config: PruneConfig::default(),
        }
    }

    /// Load the config file. An explicit path must exist; otherwise the
    /// working directory and then the user config dir are searched.
    pub async fn load_file(mut self, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => Self::discover(),
        };

        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            let content = fs::read_to_string(&path).await?;
            self.config = PruneConfig::from_toml_str(&content).map_err(|e| {
                Error::Config(format!("failed to parse {}: {e}", path.display()))
            })?;
        }

        Ok(self)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }

        get_user_config_dir()
            .ok()
            .map(|dir| dir.join("config.toml"))
            .filter(|path| path.exists())
    }

    pub fn merge_env_vars(self) -> Result<Self> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using `lookup` to resolve variables
    pub fn merge_env_with<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefixed = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(token) = prefixed("PRIVATE_TOKEN").or_else(|| lookup("PRIVATE_TOKEN")) {
            if !token.trim().is_empty() {
                self.config.private_token = Some(token);
            }
        }

        if let Some(level) = prefixed("LOG_LEVEL").or_else(|| lookup("LOG_LEVEL")) {
            self.config.log_level = Some(level);
        }

        if let Some(api_url) = prefixed("API_URL") {
            self.config.api_url = api_url;
        }

        if let Some(value) = prefixed("PER_PAGE") {
            self.config.per_page = parse_env("PER_PAGE", &value)?;
        }

        if let Some(value) = prefixed("MAX_CONCURRENT_REQUESTS") {
            self.config.max_concurrent_requests = parse_env("MAX_CONCURRENT_REQUESTS", &value)?;
        }

        if let Some(value) = prefixed("REQUEST_TIMEOUT_SECS") {
            self.config.request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = prefixed("FAIL_ON_ERRORS") {
            self.config.fail_on_errors = parse_env("FAIL_ON_ERRORS", &value)?;
        }

        if let Some(value) = prefixed("WHITELIST_MEMBERS") {
            self.config.whitelist_members = split_list(&value);
        }

        if let Some(value) = prefixed("WHITELIST_GROUPS") {
            self.config.whitelist_groups = split_list(&value);
        }

        Ok(self)
    }

    pub fn build(self) -> Result<PruneConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| {
        Error::Config(format!("{ENV_PREFIX}{name}='{value}' is invalid: {e}"))
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
