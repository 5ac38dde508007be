use crate::{Result, RoleName, Transcript};
use async_trait::async_trait;
use std::sync::Arc;

/// A pipeline participant: given the transcript so far, produce one message.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn role(&self) -> RoleName;

    async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<crate::Message>;
}

/// Read-only view of one turn of a pipeline run.
pub trait InvocationContext: Send + Sync {
    fn invocation_id(&self) -> &str;
    /// 1-based index of the role invocation within the run.
    fn turn(&self) -> u32;
    fn query(&self) -> &str;
    fn transcript(&self) -> &Transcript;
}
