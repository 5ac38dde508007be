use crate::context::AgentToolContext;
use async_trait::async_trait;
use duet_core::{
    Agent, Content, DuetError, FunctionResponseData, GenerateContentConfig, InvocationContext, Llm,
    LlmRequest, Message, Part, Result, RoleName, Tool, Transcript,
};
use duet_telemetry::{Instrument, model_call_span, tool_execute_span};
use futures::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Default bound on model calls that end in function calls within one turn.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 4;

/// An agent whose message comes from a model call, optionally after the model
/// invoked one of the agent's tools.
pub struct LlmAgent {
    name: String,
    description: String,
    role: RoleName,
    instruction: String,
    model: Arc<dyn Llm>,
    tools: Vec<Arc<dyn Tool>>,
    reflect_on_tool_use: bool,
    max_tool_rounds: u32,
    config: Option<GenerateContentConfig>,
    stream: bool,
}

impl std::fmt::Debug for LlmAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAgent")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("model", &self.model.name())
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("reflect_on_tool_use", &self.reflect_on_tool_use)
            .field("stream", &self.stream)
            .finish()
    }
}

pub struct LlmAgentBuilder {
    name: String,
    description: Option<String>,
    role: Option<RoleName>,
    instruction: Option<String>,
    model: Option<Arc<dyn Llm>>,
    tools: Vec<Arc<dyn Tool>>,
    reflect_on_tool_use: bool,
    max_tool_rounds: u32,
    config: Option<GenerateContentConfig>,
    stream: bool,
}

impl LlmAgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            role: None,
            instruction: None,
            model: None,
            tools: Vec::new(),
            reflect_on_tool_use: false,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            config: None,
            stream: false,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn role(mut self, role: RoleName) -> Self {
        self.role = Some(role);
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn model(mut self, model: Arc<dyn Llm>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// When false (the default) the tool output itself becomes the agent's
    /// message. When true the output is fed back to the model for a final answer.
    pub fn reflect_on_tool_use(mut self, reflect: bool) -> Self {
        self.reflect_on_tool_use = reflect;
        self
    }

    pub fn max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn generate_config(mut self, config: GenerateContentConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Ask the model for a streamed response. Chunks are merged before the
    /// agent acts on them, so the emitted message is the same either way.
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn build(self) -> Result<LlmAgent> {
        let model = self.model.ok_or_else(|| DuetError::Agent("Model is required".to_string()))?;
        let role = self.role.ok_or_else(|| DuetError::Agent("Role is required".to_string()))?;
        if role == RoleName::User {
            return Err(DuetError::Agent("an agent cannot speak as the user".to_string()));
        }

        Ok(LlmAgent {
            name: self.name,
            description: self.description.unwrap_or_default(),
            role,
            instruction: self.instruction.unwrap_or_default(),
            model,
            tools: self.tools,
            reflect_on_tool_use: self.reflect_on_tool_use,
            max_tool_rounds: self.max_tool_rounds,
            config: self.config,
            stream: self.stream,
        })
    }
}

impl LlmAgent {
    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Render the instruction and transcript as model contents. The agent's own
    /// messages become `model` turns; everyone else speaks as `user`.
    fn build_contents(&self, transcript: &Transcript) -> Vec<Content> {
        let mut contents = Vec::with_capacity(transcript.len() + 1);
        if !self.instruction.is_empty() {
            contents.push(Content::new("system").with_text(&self.instruction));
        }
        for message in transcript {
            let content = if message.sender == self.role {
                Content::new("model").with_text(&message.content)
            } else if message.sender == RoleName::User {
                Content::new("user").with_text(&message.content)
            } else {
                Content::new("user").with_text(format!("[{}] {}", message.sender, message.content))
            };
            contents.push(content);
        }
        contents
    }

    fn tool_declarations(&self) -> HashMap<String, Value> {
        self.tools.iter().map(|tool| (tool.name().to_string(), tool.declaration())).collect()
    }

    /// One model call, with streamed chunks merged into a single content.
    async fn call_model(&self, request: LlmRequest) -> Result<Content> {
        let span = model_call_span(self.model.name());
        let mut stream =
            self.model.generate_content(request, self.stream).instrument(span).await?;

        let mut accumulated: Option<Content> = None;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Some(content) = chunk.content {
                match accumulated.as_mut() {
                    Some(acc) => merge_parts(acc, content.parts),
                    None => accumulated = Some(content),
                }
            }
            if chunk.turn_complete {
                break;
            }
        }

        accumulated.filter(|c| !c.parts.is_empty()).ok_or_else(|| {
            DuetError::Model(format!("model '{}' returned no content", self.model.name()))
        })
    }

    async fn execute_calls(
        &self,
        ctx: &Arc<dyn InvocationContext>,
        content: &Content,
    ) -> Result<Vec<Part>> {
        let mut responses = Vec::new();
        for part in content.function_calls() {
            let Part::FunctionCall { name, args, id } = part else { continue };

            let tool = self
                .tools
                .iter()
                .find(|t| t.name() == name)
                .ok_or_else(|| {
                    DuetError::Tool(format!("agent '{}' has no tool '{name}'", self.name))
                })?;

            let call_id =
                id.clone().unwrap_or_else(|| format!("{}_{}", ctx.invocation_id(), name));
            let tool_ctx =
                Arc::new(AgentToolContext::new(ctx.invocation_id(), &self.name, call_id));
            let response =
                tool.execute(tool_ctx, args.clone()).instrument(tool_execute_span(name)).await?;

            responses.push(Part::FunctionResponse {
                function_response: FunctionResponseData { name: name.clone(), response },
                id: id.clone(),
            });
        }
        Ok(responses)
    }
}

fn merge_parts(acc: &mut Content, parts: Vec<Part>) {
    for part in parts {
        if let (Some(Part::Text { text: existing }), Part::Text { text }) =
            (acc.parts.last_mut(), &part)
        {
            existing.push_str(text);
            continue;
        }
        acc.parts.push(part);
    }
}

fn response_text(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::FunctionResponse { function_response, .. } => {
                Some(match &function_response.response {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn role(&self) -> RoleName {
        self.role
    }

    async fn run(&self, ctx: Arc<dyn InvocationContext>) -> Result<Message> {
        let mut contents = self.build_contents(ctx.transcript());
        let tools = self.tool_declarations();
        let mut tool_rounds = 0;

        loop {
            let request = LlmRequest {
                model: self.model.name().to_string(),
                contents: contents.clone(),
                config: self.config.clone(),
                tools: tools.clone(),
            };
            let content = self.call_model(request).await?;

            if !content.has_function_calls() {
                let text = content.text().ok_or_else(|| {
                    DuetError::Model(format!("model '{}' returned no text", self.model.name()))
                })?;
                return Ok(Message::new(self.role, text));
            }

            tool_rounds += 1;
            if tool_rounds > self.max_tool_rounds {
                return Err(DuetError::Agent(format!(
                    "agent '{}' exceeded {} tool rounds",
                    self.name, self.max_tool_rounds
                )));
            }

            let responses = self.execute_calls(&ctx, &content).await?;
            tracing::debug!(
                agent.name = %self.name,
                calls = responses.len(),
                "executed tool calls"
            );

            if !self.reflect_on_tool_use {
                return Ok(Message::new(self.role, response_text(&responses)));
            }

            contents.push(content);
            contents.push(Content { role: "tool".to_string(), parts: responses });
        }
    }
}
