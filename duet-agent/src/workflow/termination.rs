use duet_core::Transcript;

/// Predicate checked on the transcript after each responder turn.
pub trait TerminationCondition: Send + Sync {
    fn should_stop(&self, transcript: &Transcript) -> bool;
}

/// Stop once the transcript, user query included, holds at least `n` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxMessages(pub usize);

impl TerminationCondition for MaxMessages {
    fn should_stop(&self, transcript: &Transcript) -> bool {
        transcript.len() >= self.0
    }
}

/// Stop when the latest message contains the given text, e.g. `TERMINATE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMention(pub String);

impl TextMention {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl TerminationCondition for TextMention {
    fn should_stop(&self, transcript: &Transcript) -> bool {
        transcript.last().is_some_and(|m| m.content.contains(&self.0))
    }
}
