use duet_core::{InvocationContext, ToolContext, Transcript};

/// Snapshot handed to the agent holding the current turn.
pub struct TurnContext {
    invocation_id: String,
    turn: u32,
    query: String,
    transcript: Transcript,
}

impl TurnContext {
    pub fn new(
        invocation_id: impl Into<String>,
        turn: u32,
        query: impl Into<String>,
        transcript: Transcript,
    ) -> Self {
        Self { invocation_id: invocation_id.into(), turn, query: query.into(), transcript }
    }
}

impl InvocationContext for TurnContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    fn turn(&self) -> u32 {
        self.turn
    }

    fn query(&self) -> &str {
        &self.query
    }

    fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}

pub(crate) struct AgentToolContext {
    invocation_id: String,
    agent_name: String,
    function_call_id: String,
}

impl AgentToolContext {
    pub(crate) fn new(invocation_id: &str, agent_name: &str, function_call_id: String) -> Self {
        Self {
            invocation_id: invocation_id.to_string(),
            agent_name: agent_name.to_string(),
            function_call_id,
        }
    }
}

impl ToolContext for AgentToolContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    fn agent_name(&self) -> &str {
        &self.agent_name
    }

    fn function_call_id(&self) -> &str {
        &self.function_call_id
    }
}
