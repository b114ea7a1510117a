//! Multi-turn test loop for a deployed flow

use std::time::Instant;

use serde_json::Value;

use crate::bedrock::traits::{FlowRuntime, InvokeRequest};
use crate::cli::console::{Console, Style};
use crate::cli::prompt::Prompter;
use crate::cli::render::render_payload;
use crate::core::{FlowError, InputContent, Result, TurnRole};
use crate::flow::conversation::Conversation;
use crate::flow::events::{drain_events, InvocationOutcome};
use crate::flow::payload::{build_payload, TurnInput};

/// Prompt shown when a node asks for more input
pub const REPLY_PROMPT: &str = "\nYour response: ";

/// Drives invocations until the flow succeeds or fails
pub struct InvocationLoop<'a> {
    runtime: &'a dyn FlowRuntime,
    console: &'a mut Console,
    prompter: &'a mut dyn Prompter,
    multivalued: bool,
}

impl<'a> InvocationLoop<'a> {
    pub fn new(
        runtime: &'a dyn FlowRuntime,
        console: &'a mut Console,
        prompter: &'a mut dyn Prompter,
        multivalued: bool,
    ) -> Self {
        Self {
            runtime,
            console,
            prompter,
            multivalued,
        }
    }

    /// Run the conversation starting from `first`; returns the final output
    pub async fn run(&mut self, conversation: &mut Conversation, first: TurnInput) -> Result<Value> {
        let mut input = first;

        loop {
            let payload = build_payload(&input, self.multivalued)?;
            let request = InvokeRequest {
                flow_id: conversation.flow_id().to_string(),
                alias_id: conversation.alias_id().to_string(),
                execution_id: conversation.continuation_token().map(str::to_string),
                payload,
            };

            self.console.print(Style::Warning, "\nInvoking flow...");
            let started = Instant::now();

            let response = self.runtime.invoke_flow(request).await?;
            conversation.adopt_continuation_token(response.execution_id);
            let outcome = drain_events(response.events, conversation).await?;
            let elapsed = started.elapsed().as_secs_f64();

            match outcome {
                InvocationOutcome::Success(output) => {
                    tracing::info!(seconds = elapsed, "flow invocation succeeded");
                    self.console.print(
                        Style::Success,
                        format!("\n✅ Flow execution successful! ({:.2}s)", elapsed),
                    );
                    render_payload(self.console, &output);
                    return Ok(output);
                }
                InvocationOutcome::InputRequired { prompt, node_name } => {
                    tracing::debug!(seconds = elapsed, node = %node_name, "flow awaiting input");
                    self.console.print(Style::Info, "\n👥 Additional input required:");
                    render_payload(self.console, &prompt);

                    let reply = self.prompter.read_line(self.console, REPLY_PROMPT)?;
                    conversation.record(TurnRole::User, reply.clone());
                    input = TurnInput::continuation(InputContent::Text(reply), node_name);
                }
                InvocationOutcome::Failure(status) => {
                    return Err(FlowError::UnexpectedStatus(status));
                }
            }
        }
    }
}
