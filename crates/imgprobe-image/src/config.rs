//! Verifier configuration loading

use crate::error::{Error, Result};
use camino::Utf8Path;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding the per-request timeout (seconds)
pub const TIMEOUT_ENV: &str = "IMGPROBE_TIMEOUT_SECS";

/// Environment variable overriding the HTTP user agent
pub const USER_AGENT_ENV: &str = "IMGPROBE_USER_AGENT";

fn default_user_agent() -> String {
    format!("imgprobe/{}", crate::VERSION)
}

/// Transport settings shared by the registry session and the hub client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Per-request timeout; no timeout when unset
    pub timeout_secs: Option<u64>,

    /// User agent sent with every request
    pub user_agent: String,

    /// Registry host -> base URL overrides (e.g. mirrors, plain-http test registries)
    pub endpoints: BTreeMap<String, String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: default_user_agent(),
            endpoints: BTreeMap::new(),
        }
    }
}

impl VerifierConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        debug!("Loaded verifier config from {}", path);
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `IMGPROBE_*` environment overrides on top of this config
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var(TIMEOUT_ENV) {
            let secs = value.trim().parse::<u64>().map_err(|_| {
                Error::invalid_config(format!("{} must be a whole number, got '{}'", TIMEOUT_ENV, value))
            })?;
            self.timeout_secs = Some(secs);
        }
        if let Ok(value) = std::env::var(USER_AGENT_ENV) {
            if !value.is_empty() {
                self.user_agent = value;
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Set the per-request timeout, rounded up to whole seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self.timeout_secs = Some(secs);
        self.validate()?;
        Ok(self)
    }

    /// Route requests for `registry` to `base_url` instead of `https://<registry>`
    pub fn with_endpoint(mut self, registry: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.endpoints.insert(registry.into(), base_url.into());
        self
    }

    /// Base URL for a registry host, without trailing slash
    pub fn endpoint(&self, registry: &str) -> String {
        match self.endpoints.get(registry) {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}", registry),
        }
    }

    /// Per-request timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Build the HTTP client used for every request
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to build HTTP client: {}", e)))
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == Some(0) {
            return Err(Error::invalid_config("timeout_secs must be greater than zero"));
        }
        for (registry, base) in &self.endpoints {
            url::Url::parse(base).map_err(|e| {
                Error::invalid_config(format!(
                    "endpoint for {} is not a valid URL ({}): {}",
                    registry, base, e
                ))
            })?;
        }
        Ok(())
    }
}
