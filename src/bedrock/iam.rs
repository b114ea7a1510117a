//! IAM role management backed by `aws-sdk-iam`

use async_trait::async_trait;
use aws_sdk_iam::types::Role;
use aws_sdk_iam::Client;

use crate::bedrock::policy::{flow_execution_policy, trust_policy};
use crate::bedrock::traits::RoleProvider;
use crate::core::config::FlowConfig;
use crate::core::{FlowError, Result};

/// Gets or creates the role flows execute as
#[derive(Debug, Clone)]
pub struct IamRoleProvider {
    client: Client,
    role_name: String,
    policy_name: String,
}

impl IamRoleProvider {
    /// Create a provider for the configured managed role
    pub fn new(client: Client, config: &FlowConfig) -> Self {
        Self {
            client,
            role_name: config.role_name.clone(),
            policy_name: config.policy_name.clone(),
        }
    }

    /// Look up a role; `Ok(None)` when it does not exist
    async fn find_role(&self, role_name: &str) -> Result<Option<String>> {
        match self.client.get_role().role_name(role_name).send().await {
            Ok(output) => {
                let role: Option<&Role> = output.role().into();
                Ok(role.map(|r| r.arn().to_string()))
            }
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_no_such_entity_exception())
                    .unwrap_or(false);
                if missing {
                    Ok(None)
                } else {
                    Err(FlowError::remote("GetRole", err))
                }
            }
        }
    }

    async fn create_role(&self) -> Result<String> {
        tracing::info!(role = %self.role_name, "creating flow execution role");

        let output = self
            .client
            .create_role()
            .role_name(&self.role_name)
            .assume_role_policy_document(trust_policy().to_string())
            .description("Role for Amazon Bedrock Flows")
            .send()
            .await
            .map_err(|e| FlowError::remote("CreateRole", e))?;

        let role: Option<&Role> = output.role().into();
        let arn = role
            .map(|r| r.arn().to_string())
            .ok_or_else(|| FlowError::service("CreateRole", 200, "response carried no role"))?;

        self.client
            .put_role_policy()
            .role_name(&self.role_name)
            .policy_name(&self.policy_name)
            .policy_document(flow_execution_policy().to_string())
            .send()
            .await
            .map_err(|e| FlowError::remote("PutRolePolicy", e))?;

        Ok(arn)
    }
}

#[async_trait]
impl RoleProvider for IamRoleProvider {
    async fn ensure_role(&self, existing_role: Option<&str>) -> Result<String> {
        if let Some(name) = existing_role {
            return self.find_role(name).await?.ok_or_else(|| {
                FlowError::service("GetRole", 404, format!("role {} does not exist", name))
            });
        }

        match self.find_role(&self.role_name).await? {
            Some(arn) => {
                tracing::debug!(role = %self.role_name, "reusing flow execution role");
                Ok(arn)
            }
            None => self.create_role().await,
        }
    }
}
