//! Shared types used across bedrock-flows modules
//!
//! Contains template records, conversation turns, and flow input shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Template-shaped flow document, as stored in the templates directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTemplate {
    /// Flow name
    pub name: String,
    /// Flow description
    #[serde(default)]
    pub description: String,
    /// Opaque flow definition (nodes and connections)
    pub definition: serde_json::Value,
    /// Resource tags
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Execution role override
    pub execution_role_arn: Option<String>,
}

/// Template metadata that travels alongside the definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    pub description: String,
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub execution_role_arn: Option<String>,
}

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single turn in a flow conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl Turn {
    /// Create a turn stamped with the current local time
    pub fn now(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }
}

/// Input handed to a flow node
///
/// The shape is fixed when the input is accepted, either from the command
/// line or from an interactive reply.
#[derive(Debug, Clone, PartialEq)]
pub enum InputContent {
    /// A single text value
    Text(String),
    /// Several text values, in order
    Texts(Vec<String>),
    /// An already-structured JSON document
    Document(serde_json::Value),
}

impl InputContent {
    /// Build input from command-line values: one value is text, several are a list
    pub fn from_args(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(InputContent::Text),
            _ => Some(InputContent::Texts(values)),
        }
    }

    /// Short name of the shape, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            InputContent::Text(_) => "text",
            InputContent::Texts(_) => "list of texts",
            InputContent::Document(value) => match value {
                serde_json::Value::Null => "null",
                serde_json::Value::Bool(_) => "boolean",
                serde_json::Value::Number(_) => "number",
                serde_json::Value::String(_) => "string document",
                serde_json::Value::Array(_) => "array document",
                serde_json::Value::Object(_) => "object",
            },
        }
    }
}

/// Render a JSON payload as plain text for the conversation log
pub fn payload_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
