use super::termination::TerminationCondition;
use crate::context::TurnContext;
use async_stream::stream;
use duet_core::{Agent, DuetError, InvocationContext, Message, Result, RoleName, Transcript};
use duet_telemetry::{Instrument, agent_run_span, pipeline_run_span};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

/// Default bound on role invocations per run.
pub const DEFAULT_MAX_TURNS: u32 = 4;

/// Messages of one run in transcript order.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// Per-run limits for a [`TurnCoordinator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Maximum role invocations. `None` or `0` means [`DEFAULT_MAX_TURNS`].
    pub max_turns: Option<u32>,
}

impl CoordinatorConfig {
    pub fn effective_max_turns(&self) -> u32 {
        match self.max_turns {
            Some(n) if n > 0 => n,
            _ => DEFAULT_MAX_TURNS,
        }
    }
}

/// Whose turn it is. A run starts `Idle`, alternates between the two role
/// turns and ends in `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    RetrieverTurn,
    ResponderTurn,
    Done,
}

impl TurnState {
    /// State after the current one completes. `turns_taken` counts role
    /// invocations so far; `terminated` only matters after a responder turn.
    pub fn advance(self, turns_taken: u32, max_turns: u32, terminated: bool) -> TurnState {
        match self {
            TurnState::Idle if max_turns == 0 => TurnState::Done,
            TurnState::Idle => TurnState::RetrieverTurn,
            TurnState::RetrieverTurn if turns_taken >= max_turns => TurnState::Done,
            TurnState::RetrieverTurn => TurnState::ResponderTurn,
            TurnState::ResponderTurn if terminated || turns_taken >= max_turns => TurnState::Done,
            TurnState::ResponderTurn => TurnState::RetrieverTurn,
            TurnState::Done => TurnState::Done,
        }
    }

    /// The role that speaks in this state.
    pub fn role(self) -> Option<RoleName> {
        match self {
            TurnState::RetrieverTurn => Some(RoleName::Retriever),
            TurnState::ResponderTurn => Some(RoleName::Responder),
            TurnState::Idle | TurnState::Done => None,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Shared by every span and context of the run.
    pub invocation_id: String,
    /// The user query followed by every role message, in order.
    pub transcript: Transcript,
    /// Role invocations performed.
    pub turns: u32,
    /// The last responder message, if the responder spoke at all.
    pub result: Option<Message>,
}

impl RunOutcome {
    /// Text of [`RunOutcome::result`].
    pub fn final_text(&self) -> Option<&str> {
        self.result.as_ref().map(|m| m.content.as_str())
    }
}

/// Runs a retriever and a responder in strict alternation, retriever first,
/// until the turn limit is reached or a termination condition fires after a
/// responder turn.
///
/// Each run owns a fresh transcript. Any agent error ends the run.
pub struct TurnCoordinator {
    retriever: Arc<dyn Agent>,
    responder: Arc<dyn Agent>,
    config: CoordinatorConfig,
    termination: Option<Arc<dyn TerminationCondition>>,
}

impl TurnCoordinator {
    /// Fails with [`DuetError::Config`] unless `retriever` plays the retriever
    /// role and `responder` the responder role.
    pub fn new(retriever: Arc<dyn Agent>, responder: Arc<dyn Agent>) -> Result<Self> {
        let roles = [(&retriever, RoleName::Retriever), (&responder, RoleName::Responder)];
        for (agent, expected) in roles {
            if agent.role() != expected {
                return Err(DuetError::Config(format!(
                    "agent '{}' has role {}, expected {expected}",
                    agent.name(),
                    agent.role()
                )));
            }
        }
        Ok(Self { retriever, responder, config: CoordinatorConfig::default(), termination: None })
    }

    /// Bound the run to `max_turns` role invocations. `0` restores the default.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.config.max_turns = Some(max_turns);
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Stop early when `condition` holds after a responder turn. Without one,
    /// a run always uses the full turn budget.
    pub fn with_termination(mut self, condition: impl TerminationCondition + 'static) -> Self {
        self.termination = Some(Arc::new(condition));
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Stream the transcript as it grows: the user query first, then one
    /// message per role invocation. An agent error is yielded last.
    pub fn run_stream(&self, query: impl Into<String>) -> MessageStream {
        self.turns(uuid::Uuid::new_v4().to_string(), query.into())
    }

    /// Run to completion and collect the transcript.
    ///
    /// The final result is the last responder message, or `None` when the
    /// responder never spoke. The first agent error aborts the run and is
    /// returned as is.
    pub async fn run(&self, query: impl Into<String>) -> Result<RunOutcome> {
        let invocation_id = uuid::Uuid::new_v4().to_string();
        let span = pipeline_run_span(&invocation_id, self.config.effective_max_turns());
        let mut messages = self.turns(invocation_id.clone(), query.into());

        async move {
            let mut transcript = Transcript::new();
            while let Some(message) = messages.next().await {
                transcript.push(message?);
            }

            let turns = transcript.turn_order().len() as u32;
            let result = transcript.last_from(RoleName::Responder).cloned();
            tracing::info!(turns, answered = result.is_some(), "pipeline run complete");

            Ok::<_, DuetError>(RunOutcome { invocation_id, transcript, turns, result })
        }
        .instrument(span)
        .await
    }

    fn turns(&self, invocation_id: String, query: String) -> MessageStream {
        let retriever = self.retriever.clone();
        let responder = self.responder.clone();
        let termination = self.termination.clone();
        let max_turns = self.config.effective_max_turns();

        let s = stream! {
            let mut transcript = Transcript::new();
            let opening = Message::new(RoleName::User, query.clone());
            transcript.push(opening.clone());
            yield Ok(opening);

            let mut turns = 0;
            let mut state = TurnState::Idle.advance(turns, max_turns, false);

            while state != TurnState::Done {
                let agent = match state {
                    TurnState::RetrieverTurn => &retriever,
                    TurnState::ResponderTurn => &responder,
                    TurnState::Idle | TurnState::Done => break,
                };
                turns += 1;

                let ctx: Arc<dyn InvocationContext> = Arc::new(TurnContext::new(
                    invocation_id.clone(),
                    turns,
                    query.clone(),
                    transcript.clone(),
                ));
                let span = agent_run_span(agent.name(), &invocation_id, turns);

                match agent.run(ctx).instrument(span).await {
                    Ok(message) => {
                        // The coordinator decides who spoke, not the agent.
                        let message = Message::new(agent.role(), message.content);
                        transcript.push(message.clone());
                        yield Ok(message);
                    }
                    Err(e) => {
                        tracing::error!(
                            agent.name = agent.name(),
                            turn = turns,
                            error = %e,
                            "agent failed"
                        );
                        yield Err(e);
                        return;
                    }
                }

                let terminated = state == TurnState::ResponderTurn
                    && termination.as_ref().is_some_and(|t| t.should_stop(&transcript));
                state = state.advance(turns, max_turns, terminated);
            }
        };

        Box::pin(s)
    }
}
