//! Amazon Bedrock backends
//!
//! - `traits`: the seams the flow manager talks through
//! - `iam`: execution role lookup and creation
//! - `control_plane`: flow, version and alias management over the REST API
//! - `runtime`: flow invocation and event streaming

pub mod control_plane;
pub mod document;
pub mod iam;
pub mod policy;
pub mod runtime;
pub mod signing;
pub mod traits;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};

pub use control_plane::BedrockAgentClient;
pub use iam::IamRoleProvider;
pub use runtime::BedrockFlowRuntime;
pub use signing::RequestSigner;
pub use traits::{
    CreateFlowRequest, EventStream, FlowControlPlane, FlowDetails, FlowEvent, FlowPayload,
    FlowRuntime, InvocationStream, InvokeRequest, PayloadTarget, RoleProvider,
};

use crate::core::{Config, FlowError, Result};

/// The three remote services, ready to hand to a `FlowManager`
#[derive(Clone)]
pub struct Backends {
    pub roles: Arc<dyn RoleProvider>,
    pub control_plane: Arc<dyn FlowControlPlane>,
    pub runtime: Arc<dyn FlowRuntime>,
}

/// Build AWS clients for the configured region and profile
pub async fn connect(config: &Config) -> Result<Backends> {
    let region = config.aws.region.clone();
    tracing::debug!(region = %region, profile = %config.aws.profile, "loading AWS configuration");

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.clone()))
        .profile_name(&config.aws.profile)
        .load()
        .await;

    let credentials = sdk_config.credentials_provider().ok_or_else(|| {
        FlowError::config(format!(
            "No AWS credentials available for profile {}",
            config.aws.profile
        ))
    })?;
    let signer = RequestSigner::new(credentials, region.clone());

    Ok(Backends {
        roles: Arc::new(IamRoleProvider::new(
            aws_sdk_iam::Client::new(&sdk_config),
            &config.flow,
        )),
        control_plane: Arc::new(BedrockAgentClient::new(signer, &region)?),
        runtime: Arc::new(BedrockFlowRuntime::new(
            aws_sdk_bedrockagentruntime::Client::new(&sdk_config),
        )),
    })
}
