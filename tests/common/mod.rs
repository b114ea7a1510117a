//! In-memory stand-ins for the remote services

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bedrock_flows::bedrock::{
    Backends, CreateFlowRequest, FlowControlPlane, FlowDetails, FlowEvent, FlowRuntime,
    InvocationStream, InvokeRequest, RoleProvider,
};
use bedrock_flows::cli::console::SharedBuffer;
use bedrock_flows::cli::{Console, ScriptedPrompter};
use bedrock_flows::{Config, FlowError, FlowManager, Result};
use serde_json::{json, Value};

pub const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/BedrockFlowsRole";

/// Role provider that always resolves to [`ROLE_ARN`]
#[derive(Default)]
pub struct FakeRoles {
    pub requested: Mutex<Vec<Option<String>>>,
}

#[async_trait]
impl RoleProvider for FakeRoles {
    async fn ensure_role(&self, existing_role: Option<&str>) -> Result<String> {
        self.requested
            .lock()
            .unwrap()
            .push(existing_role.map(str::to_string));
        Ok(ROLE_ARN.to_string())
    }
}

/// Control plane that records every call and fails the named operation
#[derive(Default)]
pub struct RecordingControlPlane {
    calls: Mutex<Vec<String>>,
    created: Mutex<Vec<CreateFlowRequest>>,
    fail_on: Mutex<Vec<&'static str>>,
    flow: Mutex<Option<FlowDetails>>,
}

impl RecordingControlPlane {
    /// Fail every call to `operation` with a service error
    pub fn failing_on(operations: &[&'static str]) -> Self {
        let plane = Self::default();
        plane.fail_on.lock().unwrap().extend_from_slice(operations);
        plane
    }

    /// Answer `get_flow` with `details`
    pub fn with_flow(details: FlowDetails) -> Self {
        let plane = Self::default();
        *plane.flow.lock().unwrap() = Some(details);
        plane
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<CreateFlowRequest> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, args: &[&str]) -> Result<()> {
        let mut entry = operation.to_string();
        for arg in args {
            entry.push(':');
            entry.push_str(arg);
        }
        self.calls.lock().unwrap().push(entry);

        if self.fail_on.lock().unwrap().contains(&operation) {
            return Err(FlowError::service(operation, 400, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl FlowControlPlane for RecordingControlPlane {
    async fn create_flow(&self, request: &CreateFlowRequest) -> Result<String> {
        self.record("create_flow", &[&request.name])?;
        self.created.lock().unwrap().push(request.clone());
        Ok("FLOW1".to_string())
    }

    async fn prepare_flow(&self, flow_id: &str) -> Result<()> {
        self.record("prepare_flow", &[flow_id])
    }

    async fn create_flow_version(&self, flow_id: &str) -> Result<String> {
        self.record("create_flow_version", &[flow_id])?;
        Ok("1".to_string())
    }

    async fn create_flow_alias(
        &self,
        flow_id: &str,
        alias_name: &str,
        version: &str,
    ) -> Result<String> {
        self.record("create_flow_alias", &[flow_id, alias_name, version])?;
        Ok("ALIAS1".to_string())
    }

    async fn get_flow(&self, flow_id: &str) -> Result<FlowDetails> {
        self.record("get_flow", &[flow_id])?;
        self.flow
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| FlowError::service("get_flow", 404, "flow not found"))
    }

    async fn delete_flow_alias(&self, flow_id: &str, alias_id: &str) -> Result<()> {
        self.record("delete_flow_alias", &[flow_id, alias_id])
    }

    async fn delete_flow_version(&self, flow_id: &str, version: &str) -> Result<()> {
        self.record("delete_flow_version", &[flow_id, version])
    }

    async fn delete_flow(&self, flow_id: &str) -> Result<()> {
        self.record("delete_flow", &[flow_id])
    }
}

/// One scripted invocation response
pub struct ScriptedResponse {
    pub execution_id: Option<String>,
    pub events: Vec<Result<FlowEvent>>,
}

impl ScriptedResponse {
    /// Output event followed by a `SUCCESS` completion
    pub fn success(execution_id: &str, output: Value) -> Self {
        Self {
            execution_id: Some(execution_id.to_string()),
            events: vec![
                Ok(FlowEvent::Output {
                    node_name: "FlowOutputNode".into(),
                    content: output,
                }),
                Ok(completion("SUCCESS")),
            ],
        }
    }

    /// Input request from `node_name` followed by an `INPUT_REQUIRED` completion
    pub fn input_required(execution_id: &str, node_name: &str, prompt: &str) -> Self {
        Self {
            execution_id: Some(execution_id.to_string()),
            events: vec![
                Ok(FlowEvent::InputRequest {
                    node_name: node_name.into(),
                    prompt: json!(prompt),
                }),
                Ok(completion("INPUT_REQUIRED")),
            ],
        }
    }

    /// Bare completion with `reason`
    pub fn completed(execution_id: &str, reason: &str) -> Self {
        Self {
            execution_id: Some(execution_id.to_string()),
            events: vec![Ok(completion(reason))],
        }
    }
}

pub fn completion(reason: &str) -> FlowEvent {
    FlowEvent::Completion {
        reason: reason.into(),
        output: None,
    }
}

/// Runtime that replays scripted responses and records every request
#[derive(Default)]
pub struct ScriptedRuntime {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<InvokeRequest>>,
}

impl ScriptedRuntime {
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<InvokeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlowRuntime for ScriptedRuntime {
    async fn invoke_flow(&self, request: InvokeRequest) -> Result<InvocationStream> {
        self.requests.lock().unwrap().push(request);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| FlowError::service("InvokeFlow", 500, "no scripted response"))?;

        Ok(InvocationStream {
            execution_id: response.execution_id,
            events: Box::pin(futures::stream::iter(response.events)),
        })
    }
}

/// Fakes wired into a manager, kept for inspection
pub struct Harness {
    pub manager: FlowManager,
    pub output: SharedBuffer,
    pub roles: Arc<FakeRoles>,
    pub control_plane: Arc<RecordingControlPlane>,
    pub runtime: Arc<ScriptedRuntime>,
}

pub fn harness(
    config: Config,
    control_plane: RecordingControlPlane,
    runtime: ScriptedRuntime,
    answers: Vec<&str>,
) -> Harness {
    let roles = Arc::new(FakeRoles::default());
    let control_plane = Arc::new(control_plane);
    let runtime = Arc::new(runtime);
    let backends = Backends {
        roles: roles.clone(),
        control_plane: control_plane.clone(),
        runtime: runtime.clone(),
    };
    let (console, output) = Console::buffered();
    let manager = FlowManager::new(
        backends,
        config,
        console,
        Box::new(ScriptedPrompter::new(answers)),
    );

    Harness {
        manager,
        output,
        roles,
        control_plane,
        runtime,
    }
}

/// Flow details as the control plane would report them
pub fn flow_details(name: &str, tags: &[(&str, &str)]) -> FlowDetails {
    FlowDetails {
        id: "FLOW1".into(),
        name: name.into(),
        description: "Exported flow".into(),
        definition: json!({"nodes": [{"name": "FlowInputNode", "type": "Input"}]}),
        execution_role_arn: Some(ROLE_ARN.into()),
        status: Some("Prepared".into()),
        tags: tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}
