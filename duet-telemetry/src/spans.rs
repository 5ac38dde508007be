//! Span helpers for pipeline, agent, model, and tool operations.

use tracing::Span;

/// Span covering one full coordinator run.
///
/// # Example
/// ```
/// use duet_telemetry::pipeline_run_span;
/// let span = pipeline_run_span("inv-123", 4);
/// let _enter = span.enter();
/// ```
pub fn pipeline_run_span(invocation_id: &str, max_turns: u32) -> Span {
    tracing::info_span!(
        "pipeline.run",
        invocation.id = invocation_id,
        pipeline.max_turns = max_turns,
        otel.kind = "internal"
    )
}

/// Span covering one role invocation.
pub fn agent_run_span(agent_name: &str, invocation_id: &str, turn: u32) -> Span {
    tracing::info_span!(
        "agent.run",
        agent.name = agent_name,
        invocation.id = invocation_id,
        turn = turn,
        otel.kind = "internal"
    )
}

pub fn model_call_span(model_name: &str) -> Span {
    tracing::info_span!("model.call", model.name = model_name, otel.kind = "client")
}

pub fn tool_execute_span(tool_name: &str) -> Span {
    tracing::info_span!("tool.execute", tool.name = tool_name, otel.kind = "internal")
}
