use duet_core::{DuetError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variables read by [`AzureAIConfig::from_env`].
pub const ENV_ENDPOINT: &str = "AZURE_AI_ENDPOINT";
pub const ENV_API_KEY: &str = "AZURE_AI_API_KEY";
pub const ENV_MODEL: &str = "AZURE_AI_MODEL";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for one Azure AI Inference deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureAIConfig {
    /// Endpoint URL, e.g. `https://my-endpoint.eastus.inference.ai.azure.com`.
    pub endpoint: String,
    /// Sent as the `api-key` header.
    pub api_key: String,
    /// Model name deployed at the endpoint.
    pub model: String,
    /// Per-request timeout. Model calls are the only place a run can stall.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

impl AzureAIConfig {
    /// Settings with the default 60 second timeout.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: default_timeout(),
        }
    }

    /// Read `AZURE_AI_ENDPOINT`, `AZURE_AI_API_KEY` and `AZURE_AI_MODEL`.
    pub fn from_env() -> Result<Self> {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| DuetError::Config(format!("{key} environment variable not set")))
        };
        Ok(Self::new(read(ENV_ENDPOINT)?, read(ENV_API_KEY)?, read(ENV_MODEL)?))
    }

    /// Override the per-request timeout. A timed out request is retried.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
