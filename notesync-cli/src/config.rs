//! Client configuration resolved from flags, the snapshot and the environment.

use anyhow::{anyhow, Result};
use notesync_core::DEFAULT_BASE_URL;
use std::time::Duration;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "LETTA_API_KEY";

/// Environment variable overriding the default API base URL.
pub const BASE_URL_ENV: &str = "LETTA_BASE_URL";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything needed to talk to the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Resolve from the process environment. An explicit base URL (flag or
    /// snapshot) wins over `LETTA_BASE_URL`, which wins over the default.
    pub fn from_env(base_url: Option<&str>) -> Result<Self> {
        Self::resolve(
            base_url,
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(API_KEY_ENV).ok(),
        )
    }

    fn resolve(
        explicit_base_url: Option<&str>,
        env_base_url: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("{} environment variable not set", API_KEY_ENV))?;

        let base_url = explicit_base_url
            .map(str::to_string)
            .or(env_base_url)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: REQUEST_TIMEOUT,
        })
    }
}
