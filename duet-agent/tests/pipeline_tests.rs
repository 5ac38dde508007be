use duet_agent::{
    Agent, LlmAgentBuilder, TurnContext, TurnCoordinator, responder_agent, retriever_agent,
};
use duet_core::{Content, DuetError, InvocationContext, LlmResponse, Message, RoleName, Transcript};
use duet_model::MockLlm;
use duet_rag::{KeywordRetriever, RETRIEVAL_TOOL_NAME, RetrievalTool, TipStore};
use serde_json::json;
use std::sync::Arc;

fn keyword_retriever() -> Arc<KeywordRetriever> {
    Arc::new(KeywordRetriever::new(Arc::new(TipStore::default())))
}

fn retrieval_model(query: &str) -> Arc<MockLlm> {
    Arc::new(MockLlm::new("retriever-model").with_response(LlmResponse::new(
        Content::new("model").with_function_call(
            RETRIEVAL_TOOL_NAME,
            json!({ "query": query }),
            Some("call_1".to_string()),
        ),
    )))
}

fn answer_model(text: &str) -> Arc<MockLlm> {
    Arc::new(
        MockLlm::new("responder-model")
            .with_response(LlmResponse::new(Content::new("model").with_text(text))),
    )
}

fn context(query: &str) -> Arc<dyn InvocationContext> {
    let mut transcript = Transcript::new();
    transcript.push(Message::new(RoleName::User, query));
    Arc::new(TurnContext::new("inv-test", 1, query, transcript))
}

#[tokio::test]
async fn retriever_and_responder_answer_hiit_query() {
    let retriever_model = retrieval_model("HIIT workout");
    let responder_model = answer_model("Try 20 minutes of HIIT, per the Fitness Guru.");

    let retriever = retriever_agent(retriever_model.clone(), keyword_retriever()).unwrap();
    let responder = responder_agent(responder_model.clone()).unwrap();
    let outcome = TurnCoordinator::new(Arc::new(retriever), Arc::new(responder))
        .unwrap()
        .run("HIIT workout")
        .await
        .unwrap();

    let messages = outcome.transcript.messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[1].sender, RoleName::Retriever);
    assert!(messages[1].content.contains("Source: Fitness Guru =>"));
    assert_eq!(outcome.final_text(), Some("Try 20 minutes of HIIT, per the Fitness Guru."));

    // No reflection: one model call per retriever turn.
    assert_eq!(retriever_model.calls(), 2);
    assert_eq!(responder_model.calls(), 2);
}

#[tokio::test]
async fn unmatched_query_retrieves_every_tip() {
    let agent = retriever_agent(retrieval_model("zzz"), keyword_retriever()).unwrap();
    let message = agent.run(context("zzz")).await.unwrap();
    assert_eq!(message.content.lines().count(), TipStore::default().len());
}

#[tokio::test]
async fn responder_sees_instruction_and_retrieved_tips() {
    let model = Arc::new(MockLlm::new("inspect").with_handler(|req| {
        assert!(req.tools.is_empty());
        assert_eq!(req.contents[0].role, "system");
        let tips = req.last_user_text().unwrap_or_default();
        Ok(LlmResponse::new(Content::new("model").with_text(format!("Based on: {tips}"))))
    }));
    let responder = responder_agent(model).unwrap();

    let mut transcript = Transcript::new();
    transcript.push(Message::new(RoleName::User, "sleep"));
    transcript.push(Message::new(RoleName::Retriever, "Source: Sleep Specialist => Aim for 8h"));
    let ctx: Arc<dyn InvocationContext> = Arc::new(TurnContext::new("inv", 2, "sleep", transcript));

    let message = responder.run(ctx).await.unwrap();
    assert_eq!(message.content, "Based on: [retriever] Source: Sleep Specialist => Aim for 8h");
}

#[tokio::test]
async fn reflection_feeds_tool_output_back_to_model() {
    let model = Arc::new(MockLlm::new("reflecting").with_handler(|req| {
        assert!(req.tools.contains_key(RETRIEVAL_TOOL_NAME));
        let last = req.contents.last().unwrap();
        if last.role == "tool" {
            Ok(LlmResponse::new(Content::new("model").with_text("Hydrate well.")))
        } else {
            Ok(LlmResponse::new(Content::new("model").with_function_call(
                RETRIEVAL_TOOL_NAME,
                json!({"query": "water"}),
                None,
            )))
        }
    }));
    let agent = LlmAgentBuilder::new("reflector")
        .role(RoleName::Responder)
        .model(model.clone())
        .tool(Arc::new(RetrievalTool::new(keyword_retriever())))
        .reflect_on_tool_use(true)
        .build()
        .unwrap();

    let message = agent.run(context("water")).await.unwrap();
    assert_eq!(message, Message::new(RoleName::Responder, "Hydrate well."));
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn tool_rounds_are_bounded() {
    let model = Arc::new(MockLlm::new("looping").with_response(LlmResponse::new(
        Content::new("model").with_function_call(
            RETRIEVAL_TOOL_NAME,
            json!({"query": "sleep"}),
            None,
        ),
    )));
    let agent = LlmAgentBuilder::new("looper")
        .role(RoleName::Responder)
        .model(model.clone())
        .tool(Arc::new(RetrievalTool::new(keyword_retriever())))
        .reflect_on_tool_use(true)
        .max_tool_rounds(2)
        .build()
        .unwrap();

    let err = agent.run(context("sleep")).await.unwrap_err();
    assert!(matches!(err, DuetError::Agent(_)));
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn unknown_tool_aborts_run() {
    let model = Arc::new(MockLlm::new("confused").with_response(LlmResponse::new(
        Content::new("model").with_function_call("search_web", json!({"q": "HIIT"}), None),
    )));
    let retriever = retriever_agent(model, keyword_retriever()).unwrap();
    let responder_model = answer_model("unused");
    let responder = responder_agent(responder_model.clone()).unwrap();

    let err = TurnCoordinator::new(Arc::new(retriever), Arc::new(responder))
        .unwrap()
        .run("HIIT")
        .await
        .unwrap_err();
    assert!(matches!(err, DuetError::Tool(_)));
    assert_eq!(responder_model.calls(), 0);
}

#[tokio::test]
async fn empty_model_response_is_model_error() {
    let responder = responder_agent(Arc::new(MockLlm::new("silent"))).unwrap();
    let err = responder.run(context("sleep")).await.unwrap_err();
    assert!(matches!(err, DuetError::Model(_)));
}

#[tokio::test]
async fn identical_runs_with_mocked_models() {
    let build = || {
        TurnCoordinator::new(
            Arc::new(retriever_agent(retrieval_model("stretch"), keyword_retriever()).unwrap()),
            Arc::new(responder_agent(answer_model("Stretch after training.")).unwrap()),
        )
        .unwrap()
    };

    let first = build().run("stretch").await.unwrap();
    let second = build().run("stretch").await.unwrap();
    assert_eq!(first.transcript, second.transcript);
    assert_eq!(
        first.transcript.turn_order(),
        vec![RoleName::Retriever, RoleName::Responder, RoleName::Retriever, RoleName::Responder]
    );
}
