//! Azure AI Inference provider.
//!
//! Talks to a model deployed behind an Azure AI Inference endpoint using the
//! chat-completions REST API and `api-key` header authentication.
//!
//! ```rust,ignore
//! use duet_model::azure_ai::{AzureAIClient, AzureAIConfig};
//!
//! let config = AzureAIConfig::new(
//!     "https://my-endpoint.eastus.inference.ai.azure.com",
//!     "my-api-key",
//!     "gpt-4o-mini",
//! );
//! let client = AzureAIClient::new(config)?;
//! ```

mod client;
mod config;
pub(crate) mod convert;

pub use client::AzureAIClient;
pub use config::AzureAIConfig;
