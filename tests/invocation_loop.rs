//! Multi-turn invocation loop tests
//!
//! Drives the loop against a scripted runtime and checks what was sent.

mod common;

use bedrock_flows::bedrock::PayloadTarget;
use bedrock_flows::cli::{Console, ScriptedPrompter};
use bedrock_flows::core::{InputContent, TurnRole};
use bedrock_flows::flow::{Conversation, InvocationLoop, TurnInput};
use bedrock_flows::FlowError;
use common::{ScriptedResponse, ScriptedRuntime};
use serde_json::json;

fn first_turn(text: &str) -> TurnInput {
    TurnInput::initial(InputContent::Text(text.into()), "FlowInputNode")
}

#[tokio::test]
async fn test_single_turn_success() {
    let runtime = ScriptedRuntime::new(vec![ScriptedResponse::success(
        "exec-1",
        json!("Hello World"),
    )]);
    let (mut console, output) = Console::buffered();
    let mut prompter = ScriptedPrompter::default();
    let mut conversation = Conversation::new("FLOW1", "ALIAS1");

    let result = InvocationLoop::new(&runtime, &mut console, &mut prompter, false)
        .run(&mut conversation, first_turn("hi"))
        .await
        .unwrap();

    assert_eq!(result, json!("Hello World"));
    assert!(prompter.prompts().is_empty());
    assert!(output.contents().contains("Flow execution successful"));

    let requests = runtime.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].flow_id, "FLOW1");
    assert_eq!(requests[0].alias_id, "ALIAS1");
    assert_eq!(requests[0].execution_id, None);
    assert_eq!(requests[0].payload.content, json!("hi"));
    assert_eq!(
        requests[0].payload.target,
        PayloadTarget::NodeOutput("document".into())
    );
}

#[tokio::test]
async fn test_input_required_prompts_once_and_continues() {
    let runtime = ScriptedRuntime::new(vec![
        ScriptedResponse::input_required("exec-1", "AskCity", "Which city?"),
        ScriptedResponse::success("exec-1", json!("Sunny in Paris")),
    ]);
    let (mut console, _) = Console::buffered();
    let mut prompter = ScriptedPrompter::new(["Paris"]);
    let mut conversation = Conversation::new("FLOW1", "ALIAS1");

    let result = InvocationLoop::new(&runtime, &mut console, &mut prompter, false)
        .run(&mut conversation, first_turn("weather please"))
        .await
        .unwrap();

    assert_eq!(result, json!("Sunny in Paris"));
    assert_eq!(prompter.prompts().len(), 1);

    let requests = runtime.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].execution_id, None);
    assert_eq!(requests[1].execution_id.as_deref(), Some("exec-1"));
    assert_eq!(requests[1].payload.node_name, "AskCity");
    assert_eq!(requests[1].payload.content, json!("Paris"));
    assert_eq!(
        requests[1].payload.target,
        PayloadTarget::NodeInput("agentInputText".into())
    );

    let roles: Vec<TurnRole> = conversation.turns().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![TurnRole::Assistant, TurnRole::User, TurnRole::Assistant]
    );
}

#[tokio::test]
async fn test_latest_continuation_token_is_echoed() {
    let mut tokenless = ScriptedResponse::input_required("unused", "Ask", "three?");
    tokenless.execution_id = None;
    let runtime = ScriptedRuntime::new(vec![
        ScriptedResponse::input_required("exec-1", "Ask", "one?"),
        ScriptedResponse::input_required("exec-2", "Ask", "two?"),
        tokenless,
        ScriptedResponse::success("exec-3", json!("done")),
    ]);
    let (mut console, _) = Console::buffered();
    let mut prompter = ScriptedPrompter::new(["a", "b", "c"]);
    let mut conversation = Conversation::new("FLOW1", "ALIAS1");

    InvocationLoop::new(&runtime, &mut console, &mut prompter, false)
        .run(&mut conversation, first_turn("start"))
        .await
        .unwrap();

    let tokens: Vec<Option<String>> = runtime
        .requests()
        .into_iter()
        .map(|r| r.execution_id)
        .collect();
    assert_eq!(
        tokens,
        vec![
            None,
            Some("exec-1".into()),
            Some("exec-2".into()),
            Some("exec-2".into())
        ]
    );
    assert_eq!(conversation.continuation_token(), Some("exec-3"));
}

#[tokio::test]
async fn test_unexpected_status_stops_without_looping() {
    let runtime = ScriptedRuntime::new(vec![
        ScriptedResponse::completed("exec-1", "TIMED_OUT"),
        ScriptedResponse::success("exec-1", json!("never")),
    ]);
    let (mut console, _) = Console::buffered();
    let mut prompter = ScriptedPrompter::new(["unused"]);
    let mut conversation = Conversation::new("FLOW1", "ALIAS1");

    let err = InvocationLoop::new(&runtime, &mut console, &mut prompter, false)
        .run(&mut conversation, first_turn("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::UnexpectedStatus(ref s) if s == "TIMED_OUT"));
    assert_eq!(runtime.requests().len(), 1);
    assert_eq!(prompter.remaining(), 1);
}

#[tokio::test]
async fn test_multivalued_reply_is_wrapped() {
    let runtime = ScriptedRuntime::new(vec![
        ScriptedResponse::input_required("exec-1", "Ask", "more?"),
        ScriptedResponse::success("exec-1", json!(["x", "y"])),
    ]);
    let (mut console, output) = Console::buffered();
    let mut prompter = ScriptedPrompter::new(["c"]);
    let mut conversation = Conversation::new("FLOW1", "ALIAS1");

    let first = TurnInput::initial(
        InputContent::Texts(vec!["a".into(), "b".into()]),
        "FlowInputNode",
    );
    InvocationLoop::new(&runtime, &mut console, &mut prompter, true)
        .run(&mut conversation, first)
        .await
        .unwrap();

    let requests = runtime.requests();
    assert_eq!(requests[0].payload.content, json!(["a", "b"]));
    assert_eq!(requests[1].payload.content, json!(["c"]));
    assert!(output.contents().contains("Iterator Response:"));
}

#[tokio::test]
async fn test_unsupported_input_fails_before_dispatch() {
    let runtime = ScriptedRuntime::default();
    let (mut console, _) = Console::buffered();
    let mut prompter = ScriptedPrompter::default();
    let mut conversation = Conversation::new("FLOW1", "ALIAS1");

    let first = TurnInput::initial(InputContent::Document(json!({"k": "v"})), "FlowInputNode");
    let err = InvocationLoop::new(&runtime, &mut console, &mut prompter, true)
        .run(&mut conversation, first)
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::UnsupportedInputType(_)));
    assert!(runtime.requests().is_empty());
}

#[tokio::test]
async fn test_transport_error_propagates() {
    let runtime = ScriptedRuntime::default();
    let (mut console, _) = Console::buffered();
    let mut prompter = ScriptedPrompter::default();
    let mut conversation = Conversation::new("FLOW1", "ALIAS1");

    let err = InvocationLoop::new(&runtime, &mut console, &mut prompter, false)
        .run(&mut conversation, first_turn("hi"))
        .await
        .unwrap_err();

    assert!(err.is_remote());
    assert!(conversation.is_empty());
}
