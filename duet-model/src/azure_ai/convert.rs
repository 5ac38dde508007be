//! Conversions between duet contents and the Azure AI chat-completions format.
//!
//! The wire format follows OpenAI's chat completions; model turns are sent as
//! `assistant`, function results as `tool` messages keyed by `tool_call_id`.

use duet_core::{Content, FinishReason, GenerateContentConfig, LlmResponse, Part, UsageMetadata};
use serde_json::{Value, json};
use std::collections::HashMap;

pub(crate) fn build_request_body(
    model: &str,
    contents: &[Content],
    tools: &HashMap<String, Value>,
    config: Option<&GenerateContentConfig>,
    stream: bool,
) -> Value {
    let messages: Vec<Value> = contents.iter().flat_map(content_to_messages).collect();

    let mut body = json!({
        "model": model,
        "messages": messages,
        "stream": stream,
    });

    if !tools.is_empty() {
        // Sorted for a stable request body.
        let mut names: Vec<&String> = tools.keys().collect();
        names.sort();
        let tool_array: Vec<Value> = names
            .into_iter()
            .map(|name| {
                let decl = &tools[name];
                let description =
                    decl.get("description").and_then(|d| d.as_str()).unwrap_or_default();
                let parameters = decl
                    .get("parameters")
                    .cloned()
                    .unwrap_or(json!({ "type": "object", "properties": {} }));
                json!({
                    "type": "function",
                    "function": {
                        "name": name,
                        "description": description,
                        "parameters": parameters,
                    }
                })
            })
            .collect();
        body["tools"] = Value::Array(tool_array);
    }

    if let Some(cfg) = config {
        if let Some(temp) = cfg.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(top_p) = cfg.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(max_tokens) = cfg.max_output_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
    }

    body
}

/// One content can carry several function responses; each becomes its own
/// `tool` message.
fn content_to_messages(content: &Content) -> Vec<Value> {
    match content.role.as_str() {
        "model" | "assistant" => {
            let mut msg = json!({ "role": "assistant" });
            let text = content.text();
            if let Some(t) = &text {
                msg["content"] = Value::String(t.clone());
            }
            let tool_calls = extract_tool_calls(&content.parts);
            let has_tool_calls = !tool_calls.is_empty();
            if has_tool_calls {
                msg["tool_calls"] = Value::Array(tool_calls);
            }
            // Assistant messages need either content or tool_calls.
            if text.is_none() && !has_tool_calls {
                msg["content"] = Value::String(" ".to_string());
            }
            vec![msg]
        }
        "function" | "tool" => content
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionResponse { function_response, id } => Some(json!({
                    "role": "tool",
                    "tool_call_id": id
                        .clone()
                        .unwrap_or_else(|| format!("call_{}", function_response.name)),
                    "content": response_text(&function_response.response),
                })),
                _ => None,
            })
            .collect(),
        "system" => {
            vec![json!({ "role": "system", "content": content.text().unwrap_or_default() })]
        }
        _ => vec![json!({ "role": "user", "content": content.text().unwrap_or_default() })],
    }
}

fn response_text(response: &Value) -> String {
    match response {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn extract_tool_calls(parts: &[Part]) -> Vec<Value> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::FunctionCall { name, args, id } => Some(json!({
                "id": id.clone().unwrap_or_else(|| format!("call_{name}")),
                "type": "function",
                "function": {
                    "name": name,
                    "arguments": args.to_string(),
                }
            })),
            _ => None,
        })
        .collect()
}

fn parse_tool_call(tc: &Value) -> Option<Part> {
    let func = tc.get("function")?;
    let name = func.get("name").and_then(|n| n.as_str()).filter(|n| !n.is_empty())?;
    let args = func
        .get("arguments")
        .and_then(|a| a.as_str())
        .and_then(|a| serde_json::from_str(a).ok())
        .unwrap_or(json!({}));
    let id = tc.get("id").and_then(|i| i.as_str()).map(String::from);
    Some(Part::FunctionCall { name: name.to_string(), args, id })
}

fn parse_message(message: &Value) -> Option<Content> {
    let mut parts = Vec::new();

    if let Some(text) = message.get("content").and_then(|c| c.as_str()) {
        if !text.is_empty() {
            parts.push(Part::Text { text: text.to_string() });
        }
    }

    if let Some(tool_calls) = message.get("tool_calls").and_then(|tc| tc.as_array()) {
        parts.extend(tool_calls.iter().filter_map(parse_tool_call));
    }

    if parts.is_empty() { None } else { Some(Content { role: "model".to_string(), parts }) }
}

fn first_choice(body: &Value) -> Option<&Value> {
    body.get("choices").and_then(|c| c.get(0))
}

fn finish_reason(body: &Value) -> Option<FinishReason> {
    first_choice(body)
        .and_then(|choice| choice.get("finish_reason"))
        .and_then(|fr| fr.as_str())
        .map(map_finish_reason)
}

/// Parse a non-streaming chat-completions response.
///
/// ```json
/// {
///   "choices": [{"message": {"role": "assistant", "content": "..."}, "finish_reason": "stop"}],
///   "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
/// }
/// ```
pub(crate) fn parse_response(body: &Value) -> LlmResponse {
    let content =
        first_choice(body).and_then(|choice| choice.get("message")).and_then(parse_message);

    let usage_metadata = body.get("usage").map(|u| {
        let count = |key: &str| u.get(key).and_then(|v| v.as_i64()).unwrap_or(0) as i32;
        UsageMetadata {
            prompt_token_count: count("prompt_tokens"),
            candidates_token_count: count("completion_tokens"),
            total_token_count: count("total_tokens"),
        }
    });

    LlmResponse {
        content,
        usage_metadata,
        finish_reason: finish_reason(body),
        partial: false,
        turn_complete: true,
    }
}

/// Parse one SSE chunk. Tool-call argument fragments are accumulated by the
/// client, so only text deltas are surfaced here.
pub(crate) fn parse_sse_chunk(chunk: &Value) -> LlmResponse {
    let content = first_choice(chunk)
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(|c| c.as_str())
        .filter(|text| !text.is_empty())
        .map(|text| Content::new("model").with_text(text));

    let finish_reason = finish_reason(chunk);
    let is_final = finish_reason.is_some();

    LlmResponse {
        content,
        usage_metadata: None,
        finish_reason,
        partial: !is_final,
        turn_complete: is_final,
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" | "tool_calls" => FinishReason::Stop,
        "length" => FinishReason::MaxTokens,
        "content_filter" => FinishReason::Safety,
        _ => FinishReason::Other,
    }
}
