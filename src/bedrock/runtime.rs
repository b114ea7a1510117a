//! Flow invocation backed by `aws-sdk-bedrockagentruntime`

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::types::{
    FlowCompletionEvent, FlowCompletionReason, FlowInput, FlowInputContent, FlowMultiTurnInputContent,
    FlowMultiTurnInputRequestEvent, FlowOutputContent, FlowOutputEvent, FlowResponseStream,
};
use aws_sdk_bedrockagentruntime::Client;
use serde_json::Value;

use crate::bedrock::document::{from_document, to_document};
use crate::bedrock::traits::{
    FlowEvent, FlowPayload, FlowRuntime, InvocationStream, InvokeRequest, PayloadTarget,
};
use crate::core::{FlowError, Result};

/// Invokes deployed flows through the runtime endpoint
#[derive(Debug, Clone)]
pub struct BedrockFlowRuntime {
    client: Client,
}

impl BedrockFlowRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn flow_input(payload: &FlowPayload) -> Result<FlowInput> {
    let builder = FlowInput::builder()
        .node_name(&payload.node_name)
        .content(FlowInputContent::Document(to_document(&payload.content)));
    let builder = match &payload.target {
        PayloadTarget::NodeOutput(name) => builder.node_output_name(name),
        PayloadTarget::NodeInput(name) => builder.node_input_name(name),
    };
    builder
        .build()
        .map_err(|e| FlowError::remote("InvokeFlow", e))
}

fn completion(event: &FlowCompletionEvent) -> FlowEvent {
    let reason: Option<&FlowCompletionReason> = event.completion_reason().into();
    FlowEvent::Completion {
        reason: reason.map(|r| r.as_str().to_string()).unwrap_or_default(),
        output: None,
    }
}

fn input_request(event: &FlowMultiTurnInputRequestEvent) -> FlowEvent {
    let node_name: Option<&str> = event.node_name().into();
    let content: Option<&FlowMultiTurnInputContent> = event.content().into();
    FlowEvent::InputRequest {
        node_name: node_name.unwrap_or_default().to_string(),
        prompt: content
            .and_then(|c| c.as_document().ok())
            .map(from_document)
            .unwrap_or(Value::Null),
    }
}

fn output(event: &FlowOutputEvent) -> FlowEvent {
    let node_name: Option<&str> = event.node_name().into();
    let content: Option<&FlowOutputContent> = event.content().into();
    FlowEvent::Output {
        node_name: node_name.unwrap_or_default().to_string(),
        content: content
            .and_then(|c| c.as_document().ok())
            .map(from_document)
            .unwrap_or(Value::Null),
    }
}

/// Map a stream item; trace and unknown events are skipped
fn classify(event: FlowResponseStream) -> Option<FlowEvent> {
    match event {
        FlowResponseStream::FlowCompletionEvent(e) => Some(completion(&e)),
        FlowResponseStream::FlowMultiTurnInputRequestEvent(e) => Some(input_request(&e)),
        FlowResponseStream::FlowOutputEvent(e) => Some(output(&e)),
        other => {
            tracing::debug!(event = ?other, "skipping flow event");
            None
        }
    }
}

#[async_trait]
impl FlowRuntime for BedrockFlowRuntime {
    async fn invoke_flow(&self, request: InvokeRequest) -> Result<InvocationStream> {
        let input = flow_input(&request.payload)?;
        tracing::debug!(
            flow = %request.flow_id,
            alias = %request.alias_id,
            execution = ?request.execution_id,
            "invoking flow"
        );

        let output = self
            .client
            .invoke_flow()
            .flow_identifier(&request.flow_id)
            .flow_alias_identifier(&request.alias_id)
            .set_execution_id(request.execution_id.clone())
            .inputs(input)
            .send()
            .await
            .map_err(|e| FlowError::remote("InvokeFlow", e))?;

        let execution_id = output.execution_id().map(str::to_string);
        let receiver = output.response_stream;

        let events = futures::stream::unfold(Some(receiver), |state| async move {
            let mut receiver = state?;
            loop {
                match receiver.recv().await {
                    Ok(Some(event)) => {
                        if let Some(event) = classify(event) {
                            return Some((Ok(event), Some(receiver)));
                        }
                    }
                    Ok(None) => return None,
                    Err(e) => return Some((Err(FlowError::remote("InvokeFlow", e)), None)),
                }
            }
        });

        Ok(InvocationStream {
            execution_id,
            events: Box::pin(events),
        })
    }
}
