//! # duet-model
//!
//! Model collaborators for duet agents.
//!
//! - [`AzureAIClient`] - Azure AI Inference chat completions (feature `azure-ai`, default)
//! - [`MockLlm`] - Scripted model for tests and offline runs
//!
//! ```rust,no_run
//! use duet_model::azure_ai::{AzureAIClient, AzureAIConfig};
//!
//! # fn main() -> duet_core::Result<()> {
//! let model = AzureAIClient::new(AzureAIConfig::from_env()?)?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "azure-ai")]
pub mod azure_ai;
pub mod mock;
pub mod retry;

#[cfg(feature = "azure-ai")]
pub use azure_ai::{AzureAIClient, AzureAIConfig};
pub use mock::MockLlm;
pub use retry::{RequestFailure, RetryConfig, TransportKind};
