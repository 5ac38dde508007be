use duet_core::{Llm, LlmRequest, LlmResponse, LlmResponseStream, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

type ResponseHandler = Arc<dyn Fn(&LlmRequest) -> Result<LlmResponse> + Send + Sync>;

/// Deterministic model for tests and offline runs.
///
/// Either replays the scripted responses on every call, or computes one
/// response per call from the request when built with [`MockLlm::with_handler`].
pub struct MockLlm {
    name: String,
    responses: Vec<LlmResponse>,
    handler: Option<ResponseHandler>,
    calls: AtomicUsize,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), responses: vec![], handler: None, calls: AtomicUsize::new(0) }
    }

    pub fn with_response(mut self, response: LlmResponse) -> Self {
        self.responses.push(response);
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&LlmRequest) -> Result<LlmResponse> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Number of `generate_content` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_content(&self, req: LlmRequest, _stream: bool) -> Result<LlmResponseStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let responses = match &self.handler {
            Some(handler) => vec![handler(&req)?],
            None => self.responses.clone(),
        };
        let stream = async_stream::stream! {
            for response in responses {
                yield Ok(response);
            }
        };
        Ok(Box::pin(stream))
    }
}
