use super::config::AzureAIConfig;
use super::convert;
use crate::retry::{RequestFailure, RetryConfig, TransportKind, execute_with_retry};
use async_stream::try_stream;
use async_trait::async_trait;
use duet_core::{Content, DuetError, Llm, LlmRequest, LlmResponse, LlmResponseStream, Part};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;

const API_VERSION: &str = "2024-05-01-preview";

/// Chat-completions client for a model hosted on an Azure AI Inference endpoint.
pub struct AzureAIClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    retry_config: RetryConfig,
}

impl AzureAIClient {
    pub fn new(config: AzureAIConfig) -> Result<Self, DuetError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DuetError::Model(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            model: config.model,
            retry_config: RetryConfig::default(),
        })
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    fn api_url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        format!("{endpoint}/chat/completions?api-version={API_VERSION}")
    }
}

#[async_trait]
impl Llm for AzureAIClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate_content(
        &self,
        request: LlmRequest,
        stream: bool,
    ) -> Result<LlmResponseStream, DuetError> {
        let api_url = self.api_url();
        let api_key = self.api_key.clone();
        let endpoint = self.endpoint.clone();
        let client = self.client.clone();
        let retry_config = self.retry_config.clone();

        let body = convert::build_request_body(
            &self.model,
            &request.contents,
            &request.tools,
            request.config.as_ref(),
            stream,
        );

        let response_stream = try_stream! {
            let response = execute_with_retry(&retry_config, || {
                let client = client.clone();
                let api_url = api_url.clone();
                let api_key = api_key.clone();
                let body = body.clone();
                async move {
                    let resp = client
                        .post(&api_url)
                        .header("api-key", &api_key)
                        .json(&body)
                        .send()
                        .await
                        .map_err(transport_failure)?;

                    let status = resp.status();
                    if !status.is_success() {
                        let error_text = resp.text().await.unwrap_or_default();
                        return Err(RequestFailure::status(status.as_u16(), error_text));
                    }

                    Ok(resp)
                }
            })
            .await
            .map_err(|failure| failure.into_model_error("Azure AI", &endpoint))?;

            if stream {
                let mut events = Box::pin(response.bytes_stream().eventsource());
                let mut tool_calls: HashMap<u32, (String, String, String)> = HashMap::new();

                while let Some(event) = events.next().await {
                    let event =
                        event.map_err(|e| DuetError::Model(format!("Azure AI stream error: {e}")))?;
                    if event.data == "[DONE]" {
                        break;
                    }

                    let chunk_json = match serde_json::from_str::<Value>(&event.data) {
                        Ok(value) => value,
                        Err(e) => {
                            tracing::warn!("failed to parse Azure AI chunk: {e} - {}", event.data);
                            continue;
                        }
                    };

                    accumulate_tool_calls(&chunk_json, &mut tool_calls);
                    let llm_resp = convert::parse_sse_chunk(&chunk_json);

                    if llm_resp.turn_complete && !tool_calls.is_empty() {
                        let mut content = drain_tool_calls(&mut tool_calls);
                        // Text arriving with the finish chunk precedes the calls.
                        if let Some(text) = llm_resp.content {
                            content.parts.splice(0..0, text.parts);
                        }
                        yield LlmResponse {
                            content: Some(content),
                            finish_reason: llm_resp.finish_reason,
                            turn_complete: true,
                            ..Default::default()
                        };
                    } else if llm_resp.turn_complete || llm_resp.content.is_some() {
                        yield llm_resp;
                    }
                }
            } else {
                let response_json: Value = response.json().await
                    .map_err(|e| DuetError::Model(format!("Azure AI response parse failed: {e}")))?;
                yield convert::parse_response(&response_json);
            }
        };

        Ok(Box::pin(response_stream))
    }
}

/// Keep the reqwest error kind so timeouts and refused connections are retried.
fn transport_failure(e: reqwest::Error) -> RequestFailure {
    let kind = if e.is_timeout() {
        TransportKind::Timeout
    } else if e.is_connect() {
        TransportKind::Connect
    } else {
        TransportKind::Other
    };
    RequestFailure::transport(kind, e.to_string())
}

/// Merge tool-call deltas from one SSE chunk, keyed by the call's `index`.
/// Each entry is `(id, name, arguments_so_far)`.
fn accumulate_tool_calls(chunk: &Value, accumulators: &mut HashMap<u32, (String, String, String)>) {
    let Some(deltas) = chunk
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("tool_calls"))
        .and_then(|tc| tc.as_array())
    else {
        return;
    };

    for tc in deltas {
        let index = tc.get("index").and_then(|i| i.as_u64()).unwrap_or(0) as u32;
        let entry = accumulators.entry(index).or_default();

        if let Some(id) = tc.get("id").and_then(|i| i.as_str()).filter(|id| !id.is_empty()) {
            entry.0 = id.to_string();
        }
        if let Some(func) = tc.get("function") {
            let name = func.get("name").and_then(|n| n.as_str()).filter(|n| !n.is_empty());
            if let Some(name) = name {
                entry.1 = name.to_string();
            }
            if let Some(args) = func.get("arguments").and_then(|a| a.as_str()) {
                entry.2.push_str(args);
            }
        }
    }
}

fn drain_tool_calls(accumulators: &mut HashMap<u32, (String, String, String)>) -> Content {
    let mut sorted: Vec<_> = accumulators.drain().collect();
    sorted.sort_by_key(|(idx, _)| *idx);

    let parts = sorted
        .into_iter()
        .map(|(_, (id, name, args))| Part::FunctionCall {
            name,
            args: serde_json::from_str(&args).unwrap_or(serde_json::json!({})),
            id: if id.is_empty() { None } else { Some(id) },
        })
        .collect();

    Content { role: "model".to_string(), parts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let client =
            AzureAIClient::new(AzureAIConfig::new("https://example.azure.com/", "k", "m")).unwrap();
        assert_eq!(
            client.api_url(),
            "https://example.azure.com/chat/completions?api-version=2024-05-01-preview"
        );
    }

    #[test]
    fn test_tool_call_fragments_are_merged() {
        let mut acc = HashMap::new();
        accumulate_tool_calls(
            &json!({"choices": [{"delta": {"tool_calls": [{
                "index": 0, "id": "call_1",
                "function": {"name": "retrieve_tips", "arguments": "{\"que"}
            }]}}]}),
            &mut acc,
        );
        accumulate_tool_calls(
            &json!({"choices": [{"delta": {"tool_calls": [{
                "index": 0, "function": {"arguments": "ry\":\"sleep\"}"}
            }]}}]}),
            &mut acc,
        );

        let content = drain_tool_calls(&mut acc);
        assert!(acc.is_empty());
        match &content.parts[0] {
            Part::FunctionCall { name, args, id } => {
                assert_eq!(name, "retrieve_tips");
                assert_eq!(args["query"], "sleep");
                assert_eq!(id.as_deref(), Some("call_1"));
            }
            other => panic!("expected function call, got {other:?}"),
        }
    }
}
