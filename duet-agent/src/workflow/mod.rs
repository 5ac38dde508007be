mod termination;
mod turn_coordinator;

pub use termination::{MaxMessages, TerminationCondition, TextMention};
pub use turn_coordinator::{
    CoordinatorConfig, DEFAULT_MAX_TURNS, MessageStream, RunOutcome, TurnCoordinator, TurnState,
};
