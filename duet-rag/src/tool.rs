use crate::retriever::Retriever;
use crate::store::render_tips;
use async_trait::async_trait;
use duet_core::{DuetError, Result, Tool, ToolContext};
use serde_json::{Value, json};
use std::sync::Arc;

pub const RETRIEVAL_TOOL_NAME: &str = "retrieve_tips";

/// Exposes a [`Retriever`] to the model as the `retrieve_tips` function.
///
/// Takes `{"query": string}` and returns the matching tips rendered one per
/// line as a JSON string.
pub struct RetrievalTool {
    retriever: Arc<dyn Retriever>,
}

impl RetrievalTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for RetrievalTool {
    fn name(&self) -> &str {
        RETRIEVAL_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Retrieve short health and fitness tips relevant to the user's query. \
         Returns one tip per line with its source."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The user's question or keywords to look up."
                }
            },
            "required": ["query"]
        }))
    }

    async fn execute(&self, ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DuetError::Tool(format!("{RETRIEVAL_TOOL_NAME}: missing string argument 'query'"))
            })?;

        let tips = self.retriever.retrieve(query).await?;
        tracing::info!(
            invocation.id = ctx.invocation_id(),
            agent.name = ctx.agent_name(),
            retriever = self.retriever.name(),
            query,
            tips = tips.len(),
            "retrieved tips"
        );

        Ok(Value::String(render_tips(&tips)))
    }
}
