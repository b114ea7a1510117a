//! Service traits for the remote flow service
//!
//! The manager and the invocation loop only talk to these traits; the AWS
//! clients in this module implement them and tests substitute fakes.

use std::collections::BTreeMap;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;

use crate::core::Result;

/// Arguments for creating a flow
#[derive(Debug, Clone, PartialEq)]
pub struct CreateFlowRequest {
    pub name: String,
    pub description: String,
    pub definition: Value,
    pub execution_role_arn: String,
    /// Omitted from the call when empty
    pub tags: BTreeMap<String, String>,
}

/// A flow as reported by the control plane
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDetails {
    pub id: String,
    pub name: String,
    pub description: String,
    pub definition: Value,
    pub execution_role_arn: Option<String>,
    pub status: Option<String>,
    pub tags: BTreeMap<String, String>,
}

/// Where a payload is delivered on its target node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadTarget {
    /// Initial turn: the payload stands in for the named output of the input node
    NodeOutput(String),
    /// Continuation turn: the payload feeds the named input of the node that asked for it
    NodeInput(String),
}

/// One input record sent with an invocation
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPayload {
    pub node_name: String,
    pub content: Value,
    pub target: PayloadTarget,
}

/// A single flow invocation
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    pub flow_id: String,
    pub alias_id: String,
    /// Continuation token; absent on the first request of a conversation
    pub execution_id: Option<String>,
    pub payload: FlowPayload,
}

/// Events pushed by the service while an invocation runs
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    /// The flow stopped; `reason` is the raw completion reason
    Completion {
        reason: String,
        output: Option<Value>,
    },
    /// A node needs more input before the flow can continue
    InputRequest { node_name: String, prompt: Value },
    /// An output node produced a document
    Output { node_name: String, content: Value },
}

/// Boxed stream of invocation events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<FlowEvent>> + Send>>;

/// Response to an invocation: correlation id plus the event stream
pub struct InvocationStream {
    pub execution_id: Option<String>,
    pub events: EventStream,
}

/// Provides the IAM role flows execute as
#[async_trait]
pub trait RoleProvider: Send + Sync {
    /// Look up `existing_role` if given, otherwise get or create the managed role; returns its ARN
    async fn ensure_role(&self, existing_role: Option<&str>) -> Result<String>;
}

/// Flow management operations
#[async_trait]
pub trait FlowControlPlane: Send + Sync {
    /// Create a flow and return its id
    async fn create_flow(&self, request: &CreateFlowRequest) -> Result<String>;

    /// Prepare the working draft for execution
    async fn prepare_flow(&self, flow_id: &str) -> Result<()>;

    /// Snapshot the prepared draft; returns the version
    async fn create_flow_version(&self, flow_id: &str) -> Result<String>;

    /// Create an alias routing to `version`; returns the alias id
    async fn create_flow_alias(&self, flow_id: &str, alias_name: &str, version: &str)
        -> Result<String>;

    /// Fetch a flow with its full definition
    async fn get_flow(&self, flow_id: &str) -> Result<FlowDetails>;

    async fn delete_flow_alias(&self, flow_id: &str, alias_id: &str) -> Result<()>;

    async fn delete_flow_version(&self, flow_id: &str, version: &str) -> Result<()>;

    async fn delete_flow(&self, flow_id: &str) -> Result<()>;
}

/// Flow invocation
#[async_trait]
pub trait FlowRuntime: Send + Sync {
    /// Send one payload and return the stream of events it produces
    async fn invoke_flow(&self, request: InvokeRequest) -> Result<InvocationStream>;
}
