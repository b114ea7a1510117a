//! Invocation payload packaging

use serde_json::Value;

use crate::bedrock::traits::{FlowPayload, PayloadTarget};
use crate::core::{FlowError, InputContent, Result};

/// Output name an initial turn stands in for on the entry node
pub const INITIAL_TARGET: &str = "document";

/// Input name a continuation turn feeds on the requesting node
pub const CONTINUATION_TARGET: &str = "agentInputText";

/// Input for one turn of the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct TurnInput {
    pub content: InputContent,
    pub node_name: String,
    pub initial: bool,
}

impl TurnInput {
    /// First turn, delivered to the entry node
    pub fn initial(content: InputContent, node_name: impl Into<String>) -> Self {
        Self {
            content,
            node_name: node_name.into(),
            initial: true,
        }
    }

    /// Reply to a node that asked for more input
    pub fn continuation(content: InputContent, node_name: impl Into<String>) -> Self {
        Self {
            content,
            node_name: node_name.into(),
            initial: false,
        }
    }
}

fn content_value(content: &InputContent) -> Value {
    match content {
        InputContent::Text(text) => Value::String(text.clone()),
        InputContent::Texts(texts) => {
            Value::Array(texts.iter().cloned().map(Value::String).collect())
        }
        InputContent::Document(value) => value.clone(),
    }
}

/// Package a turn for the runtime
///
/// Multivalued flows always receive a list: a single text is wrapped, a list
/// passes through, and any other shape is rejected.
pub fn build_payload(input: &TurnInput, multivalued: bool) -> Result<FlowPayload> {
    let mut content = content_value(&input.content);
    if multivalued {
        content = match content {
            Value::String(text) => Value::Array(vec![Value::String(text)]),
            list @ Value::Array(_) => list,
            _ => {
                return Err(FlowError::UnsupportedInputType(
                    input.content.kind().to_string(),
                ))
            }
        };
    }

    let target = if input.initial {
        PayloadTarget::NodeOutput(INITIAL_TARGET.to_string())
    } else {
        PayloadTarget::NodeInput(CONTINUATION_TARGET.to_string())
    };

    Ok(FlowPayload {
        node_name: input.node_name.clone(),
        content,
        target,
    })
}
