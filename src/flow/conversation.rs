//! Conversation state for one flow test session

use crate::core::{Turn, TurnRole};

/// Tracks the turns and continuation token of a flow conversation
#[derive(Debug, Clone)]
pub struct Conversation {
    flow_id: String,
    alias_id: String,
    /// Latest execution id returned by the service
    continuation_token: Option<String>,
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start a conversation with no turns and no continuation token
    pub fn new(flow_id: impl Into<String>, alias_id: impl Into<String>) -> Self {
        Self {
            flow_id: flow_id.into(),
            alias_id: alias_id.into(),
            continuation_token: None,
            turns: Vec::new(),
        }
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    pub fn alias_id(&self) -> &str {
        &self.alias_id
    }

    /// Append a turn stamped with the current time
    pub fn record(&mut self, role: TurnRole, content: impl Into<String>) {
        self.turns.push(Turn::now(role, content));
    }

    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    /// Take the token from a response
    ///
    /// A response without a token keeps the current one.
    pub fn adopt_continuation_token(&mut self, token: Option<String>) {
        let Some(token) = token else {
            return;
        };
        if self.continuation_token.as_deref() != Some(token.as_str()) {
            tracing::debug!(execution_id = %token, "adopted continuation token");
            self.continuation_token = Some(token);
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render every turn as `[timestamp] role: content`
    pub fn formatted_history(&self) -> String {
        self.turns
            .iter()
            .map(|turn| {
                format!(
                    "[{}] {}: {}",
                    turn.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    turn.role,
                    turn.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
