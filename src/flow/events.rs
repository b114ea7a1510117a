//! Classification of invocation events

use futures::StreamExt;
use serde_json::Value;

use crate::bedrock::traits::{EventStream, FlowEvent};
use crate::core::{payload_text, Result, TurnRole};
use crate::flow::conversation::Conversation;

/// Completion reason of a flow that finished
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Completion reason of a flow waiting on the user
pub const STATUS_INPUT_REQUIRED: &str = "INPUT_REQUIRED";

/// Placeholder status when the stream ended without a completion event
pub const STATUS_MISSING: &str = "<missing>";

/// Result of one round trip
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// The flow finished; `Null` when no output was produced
    Success(Value),
    /// A node asked for more input
    InputRequired { prompt: Value, node_name: String },
    /// Any other completion, carrying the raw status
    Failure(String),
}

/// Fields captured while draining; later events overwrite earlier ones
#[derive(Debug, Default)]
struct Captured {
    status: Option<String>,
    output: Option<Value>,
    prompt: Option<Value>,
    node_name: Option<String>,
}

impl Captured {
    fn into_outcome(self) -> InvocationOutcome {
        match self.status.as_deref() {
            Some(STATUS_SUCCESS) => InvocationOutcome::Success(self.output.unwrap_or(Value::Null)),
            Some(STATUS_INPUT_REQUIRED) => match self.node_name {
                Some(node_name) => InvocationOutcome::InputRequired {
                    prompt: self.prompt.unwrap_or(Value::Null),
                    node_name,
                },
                None => InvocationOutcome::Failure(STATUS_INPUT_REQUIRED.to_string()),
            },
            Some(other) => InvocationOutcome::Failure(other.to_string()),
            None => InvocationOutcome::Failure(STATUS_MISSING.to_string()),
        }
    }
}

/// Consume an event stream, recording assistant turns as they arrive
///
/// A stream error is returned at once; turns recorded before it stay in the
/// conversation.
pub async fn drain_events(
    mut events: EventStream,
    conversation: &mut Conversation,
) -> Result<InvocationOutcome> {
    let mut captured = Captured::default();

    while let Some(event) = events.next().await {
        match event? {
            FlowEvent::Completion { reason, output } => {
                tracing::debug!(%reason, "flow completed");
                captured.status = Some(reason);
                if output.is_some() {
                    captured.output = output;
                }
            }
            FlowEvent::InputRequest { node_name, prompt } => {
                tracing::debug!(node = %node_name, "flow requested input");
                conversation.record(TurnRole::Assistant, payload_text(&prompt));
                captured.prompt = Some(prompt);
                captured.node_name = Some(node_name);
            }
            FlowEvent::Output { node_name, content } => {
                tracing::debug!(node = %node_name, "flow produced output");
                conversation.record(TurnRole::Assistant, payload_text(&content));
                captured.output = Some(content);
            }
        }
    }

    Ok(captured.into_outcome())
}
