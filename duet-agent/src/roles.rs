use crate::llm_agent::{LlmAgent, LlmAgentBuilder};
use duet_core::{Llm, Result, RoleName};
use duet_rag::{RetrievalTool, Retriever};
use std::sync::Arc;

pub const RETRIEVER_INSTRUCTION: &str = "You retrieve health and fitness tips. \
Call the retrieve_tips function with the user's query and nothing else.";

pub const RESPONDER_INSTRUCTION: &str = "You answer the user's question using the tips \
provided by the retriever. Mention the source of each tip you use and keep the answer short.";

/// The retrieval role. Its message is the rendered output of `retrieve_tips`.
pub fn retriever_agent(model: Arc<dyn Llm>, retriever: Arc<dyn Retriever>) -> Result<LlmAgent> {
    LlmAgentBuilder::new("retriever")
        .description("Looks up tips relevant to the user's query")
        .role(RoleName::Retriever)
        .instruction(RETRIEVER_INSTRUCTION)
        .model(model)
        .tool(Arc::new(RetrievalTool::new(retriever)))
        .reflect_on_tool_use(false)
        .build()
}

pub fn responder_agent(model: Arc<dyn Llm>) -> Result<LlmAgent> {
    LlmAgentBuilder::new("responder")
        .description("Answers the query from the retrieved tips")
        .role(RoleName::Responder)
        .instruction(RESPONDER_INSTRUCTION)
        .model(model)
        .build()
}
