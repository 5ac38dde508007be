//! # duet-core
//!
//! Core traits and types for duet agents, tools, models, and transcripts.
//!
//! ## Overview
//!
//! - [`Agent`] - One pipeline participant (retriever or responder)
//! - [`Llm`] - The model-call collaborator an agent delegates to
//! - [`Tool`] - A function the model may ask an agent to invoke
//! - [`Transcript`] / [`Message`] - Append-only history of one run
//! - [`DuetError`] / [`Result`] - Unified error handling
//!
//! ## Core Traits
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait Agent: Send + Sync {
//!     fn name(&self) -> &str;
//!     fn description(&self) -> &str;
//!     fn role(&self) -> RoleName;
//!     async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<Message>;
//! }
//! ```

pub mod agent;
pub mod error;
pub mod model;
pub mod tool;
pub mod transcript;
pub mod types;

pub use agent::{Agent, InvocationContext};
pub use error::{DuetError, Result};
pub use model::{
    FinishReason, GenerateContentConfig, Llm, LlmRequest, LlmResponse, LlmResponseStream,
    UsageMetadata,
};
pub use tool::{Tool, ToolContext};
pub use transcript::{Message, RoleName, Transcript};
pub use types::{Content, FunctionResponseData, Part};
