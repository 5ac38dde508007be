mod context;
mod llm_agent;
mod roles;
mod workflow;

pub use context::TurnContext;
pub use duet_core::Agent;
pub use llm_agent::{DEFAULT_MAX_TOOL_ROUNDS, LlmAgent, LlmAgentBuilder};
pub use roles::{RESPONDER_INSTRUCTION, RETRIEVER_INSTRUCTION, responder_agent, retriever_agent};
pub use workflow::{
    CoordinatorConfig, DEFAULT_MAX_TURNS, MaxMessages, MessageStream, RunOutcome,
    TerminationCondition, TextMention, TurnCoordinator, TurnState,
};
