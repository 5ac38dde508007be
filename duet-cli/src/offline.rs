//! Scripted models for `--offline` runs.
//!
//! The retriever model always asks for `retrieve_tips` with the user's query.
//! The responder model answers by quoting the most recent retrieved tips.

use duet_core::{Content, DuetError, LlmRequest, LlmResponse};
use duet_model::MockLlm;
use duet_rag::RETRIEVAL_TOOL_NAME;
use serde_json::json;

const RETRIEVER_PREFIX: &str = "[retriever] ";

fn user_query(req: &LlmRequest) -> Option<String> {
    req.contents.iter().find(|c| c.role == "user").and_then(Content::text)
}

pub fn retriever_model() -> MockLlm {
    MockLlm::new("offline-retriever").with_handler(|req| {
        let query = user_query(req).ok_or_else(|| {
            DuetError::Model("offline retriever: request has no user query".into())
        })?;
        Ok(LlmResponse::new(Content::new("model").with_function_call(
            RETRIEVAL_TOOL_NAME,
            json!({ "query": query }),
            None,
        )))
    })
}

pub fn responder_model() -> MockLlm {
    MockLlm::new("offline-responder").with_handler(|req| {
        let query = user_query(req).unwrap_or_default();
        let tips = req
            .contents
            .iter()
            .rev()
            .filter_map(Content::text)
            .find_map(|text| text.strip_prefix(RETRIEVER_PREFIX).map(str::to_string));

        let answer = match tips {
            Some(tips) => format!("Here is what the tips say about \"{query}\":\n{tips}"),
            None => format!("No tips were retrieved for \"{query}\"."),
        };
        Ok(LlmResponse::new(Content::new("model").with_text(answer)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_core::{Llm, Part};
    use futures::StreamExt;

    async fn first_content(model: &MockLlm, req: LlmRequest) -> Content {
        let mut stream = model.generate_content(req, false).await.unwrap();
        stream.next().await.unwrap().unwrap().content.unwrap()
    }

    #[tokio::test]
    async fn test_retriever_calls_tool_with_first_user_text() {
        let req = LlmRequest::new(
            "offline",
            vec![
                Content::new("system").with_text("retrieve"),
                Content::new("user").with_text("HIIT workout"),
                Content::new("user").with_text("[responder] earlier answer"),
            ],
        );
        let content = first_content(&retriever_model(), req).await;
        assert!(matches!(
            &content.parts[0],
            Part::FunctionCall { name, args, .. }
                if name == RETRIEVAL_TOOL_NAME && args["query"] == "HIIT workout"
        ));
    }

    #[tokio::test]
    async fn test_responder_quotes_latest_tips() {
        let req = LlmRequest::new(
            "offline",
            vec![
                Content::new("user").with_text("sleep"),
                Content::new("user").with_text("[retriever] Source: Sleep Specialist => Rest."),
            ],
        );
        let text = first_content(&responder_model(), req).await.text().unwrap();
        assert_eq!(
            text,
            "Here is what the tips say about \"sleep\":\nSource: Sleep Specialist => Rest."
        );
    }
}
