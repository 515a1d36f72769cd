use docchat::{
    agent::Agent,
    errors::{PartSide, TranslationError},
    messages::{
        parts::{RequestPart, ResponsePart, ToolCallPart},
        ModelMessage, ModelResponse,
    },
    models::{content::Content, role::Role, turn::Usage},
    providers::mock::MockProvider,
    tool::{ChatbotDeps, ROULETTE_WHEEL},
    translate::HistoryTranslator,
};
use serde_json::json;
use uuid::Uuid;

const DEPS: ChatbotDeps = ChatbotDeps { secret_number: 18 };

fn spin(square: i64) -> ModelResponse {
    ModelResponse::new(vec![ResponsePart::ToolCall(ToolCallPart::new(
        ROULETTE_WHEEL,
        json!({ "square": square }).as_object().cloned().unwrap(),
        "toolu_01roulette",
    ))])
    .with_usage(Usage::new(120, 14))
    .with_model_name(Some("claude-haiku-4-5-20251001".to_string()))
}

#[tokio::test]
async fn test_agent_run_survives_persistence() {
    let provider = MockProvider::new(vec![
        spin(18),
        ModelResponse::new(vec![ResponsePart::text("Square 18 wins!")]),
        ModelResponse::new(vec![ResponsePart::text("You asked about square 18.")]),
    ]);
    let agent = Agent::new(Box::new(provider.clone()));
    let translator = HistoryTranslator::new();
    let chat_id = Uuid::new_v4();

    let first = agent.run("Bet on 18", &DEPS, &[]).await.unwrap();
    let turns = translator.messages_to_turns(chat_id, &first).unwrap();
    let roles: Vec<_> = turns.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(turns[1].usage, Some(Usage::new(120, 14)));
    assert_eq!(turns[2].tool_responses()[0].content, "winner");

    // persist and load back through the stored content format
    let reloaded: Vec<_> = turns
        .iter()
        .map(|turn| {
            let stored = Content::encode_list(&turn.content).unwrap();
            let mut turn = turn.clone();
            turn.content = Content::decode_list(&stored).unwrap();
            turn
        })
        .collect();
    assert_eq!(reloaded, turns);

    let history = translator.turns_to_messages(&reloaded);
    let second = agent
        .run("Which square did I pick?", &DEPS, &history)
        .await
        .unwrap();
    assert_eq!(second.len(), 2);

    let seen = provider.seen();
    let conversation = seen.last().unwrap();
    assert_eq!(conversation.len(), 5);
    let Some(ModelMessage::Response(call)) = conversation.get(1) else {
        panic!("expected the tool call response");
    };
    assert_eq!(
        call.tool_calls().next().unwrap().tool_call_id,
        "toolu_01roulette"
    );
    let Some(ModelMessage::Request(returns)) = conversation.get(2) else {
        panic!("expected the tool return request");
    };
    assert!(matches!(
        &returns.parts[0],
        RequestPart::ToolReturn(r) if r.content == json!("winner")
    ));
}

#[tokio::test]
async fn test_describe_every_message_of_a_run() {
    let provider = MockProvider::new(vec![
        spin(3),
        ModelResponse::new(vec![ResponsePart::text("No luck.")]),
    ]);
    let agent = Agent::new(Box::new(provider));
    let translator = HistoryTranslator::new();

    let messages = agent.run("Bet on 3", &DEPS, &[]).await.unwrap();
    let rendered: Vec<_> = messages
        .iter()
        .map(|m| translator.describe(m).unwrap())
        .collect();

    assert!(rendered[0].starts_with("ModelRequest"));
    assert!(rendered[1].contains("Usage: input_tokens=120 output_tokens=14"));
    assert!(rendered[2].contains("loser"));
    assert!(rendered[3].contains("No luck."));
}

#[test]
fn test_stored_history_from_json_export() {
    let raw = r#"[
        {"kind": "request", "parts": [
            {"part_kind": "user-prompt", "content": "hello", "timestamp": "2025-01-01T10:00:00Z"}
        ], "instructions": "You are a chatbot. Converse with the user friendly."},
        {"kind": "response", "parts": [
            {"part_kind": "thinking", "content": "the user greets me"},
            {"part_kind": "text", "content": "Hi!"}
        ], "usage": {"input_tokens": 9, "output_tokens": 2},
        "timestamp": "2025-01-01T10:00:01Z"}
    ]"#;
    let messages = ModelMessage::list_from_json(raw).unwrap();
    let err = HistoryTranslator::new()
        .messages_to_turns(Uuid::new_v4(), &messages)
        .unwrap_err();
    assert_eq!(
        err,
        TranslationError::UnsupportedPart {
            side: PartSide::Response,
            kind: "thinking".to_string(),
        }
    );
}
