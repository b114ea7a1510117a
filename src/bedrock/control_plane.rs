//! Bedrock Agent control-plane client
//!
//! Talks to the REST API directly so flow definitions travel as the same
//! free-form JSON documents the templates hold.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::bedrock::signing::RequestSigner;
use crate::bedrock::traits::{CreateFlowRequest, FlowControlPlane, FlowDetails};
use crate::core::{FlowError, Result};

/// Bedrock Agent REST client
#[derive(Debug, Clone)]
pub struct BedrockAgentClient {
    client: Client,
    base_url: Url,
    signer: RequestSigner,
}

/// CreateFlow request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFlowBody<'a> {
    name: &'a str,
    description: &'a str,
    execution_role_arn: &'a str,
    definition: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a BTreeMap<String, String>>,
}

/// CreateFlowAlias request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAliasBody<'a> {
    name: &'a str,
    description: String,
    routing_configuration: Vec<RoutingEntry<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoutingEntry<'a> {
    flow_version: &'a str,
}

/// Responses that only carry an id
#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

/// CreateFlowVersion response
#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// GetFlow response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetFlowResponse {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    definition: Option<Value>,
    #[serde(default)]
    execution_role_arn: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    arn: Option<String>,
}

/// ListTagsForResource response
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl BedrockAgentClient {
    /// Create a client for the regional endpoint
    pub fn new(signer: RequestSigner, region: &str) -> Result<Self> {
        let base_url = Url::parse(&format!("https://bedrock-agent.{}.amazonaws.com/", region))
            .map_err(|e| FlowError::config(format!("Invalid region {}: {}", region, e)))?;
        Ok(Self::with_base_url(signer, base_url))
    }

    /// Create a client against a custom endpoint
    pub fn with_base_url(signer: RequestSigner, base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
            signer,
        }
    }

    /// Build an endpoint URL from path segments; an empty last segment gives a trailing slash
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FlowError::config(format!("Invalid endpoint: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        let payload = match body {
            Some(ref value) => serde_json::to_vec(value)?,
            None => Vec::new(),
        };
        tracing::debug!(%operation, %method, %url, "control plane request");

        let content_type = ("content-type", "application/json");
        let auth = self
            .signer
            .sign(method.as_str(), url.as_str(), &[content_type], &payload)
            .await?;

        let mut request = self
            .client
            .request(method, url)
            .header(content_type.0, content_type.1);
        for (name, value) in auth {
            request = request.header(name, value);
        }
        if body.is_some() {
            request = request.body(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(text);
            return Err(FlowError::service(operation, status.as_u16(), message));
        }

        tracing::debug!(%operation, response = %text, "control plane response");
        // Delete operations answer with an empty body
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| {
            FlowError::service(operation, status.as_u16(), format!("unreadable response: {}", e))
        })
    }

    async fn list_tags(&self, arn: &str) -> Result<BTreeMap<String, String>> {
        let response: TagsResponse = self
            .call("ListTagsForResource", Method::GET, &["tags", arn], None)
            .await?;
        Ok(response.tags)
    }
}

#[async_trait]
impl FlowControlPlane for BedrockAgentClient {
    async fn create_flow(&self, request: &CreateFlowRequest) -> Result<String> {
        let body = CreateFlowBody {
            name: &request.name,
            description: &request.description,
            execution_role_arn: &request.execution_role_arn,
            definition: &request.definition,
            tags: (!request.tags.is_empty()).then_some(&request.tags),
        };
        let response: IdResponse = self
            .call(
                "CreateFlow",
                Method::POST,
                &["flows", ""],
                Some(serde_json::to_value(&body)?),
            )
            .await?;
        Ok(response.id)
    }

    async fn prepare_flow(&self, flow_id: &str) -> Result<()> {
        let _: Value = self
            .call("PrepareFlow", Method::POST, &["flows", flow_id, ""], None)
            .await?;
        Ok(())
    }

    async fn create_flow_version(&self, flow_id: &str) -> Result<String> {
        let response: VersionResponse = self
            .call(
                "CreateFlowVersion",
                Method::POST,
                &["flows", flow_id, "versions"],
                Some(serde_json::json!({})),
            )
            .await?;
        Ok(response.version)
    }

    async fn create_flow_alias(
        &self,
        flow_id: &str,
        alias_name: &str,
        version: &str,
    ) -> Result<String> {
        let body = CreateAliasBody {
            name: alias_name,
            description: format!("Alias for version {}", version),
            routing_configuration: vec![RoutingEntry {
                flow_version: version,
            }],
        };
        let response: IdResponse = self
            .call(
                "CreateFlowAlias",
                Method::POST,
                &["flows", flow_id, "aliases"],
                Some(serde_json::to_value(&body)?),
            )
            .await?;
        Ok(response.id)
    }

    async fn get_flow(&self, flow_id: &str) -> Result<FlowDetails> {
        let response: GetFlowResponse = self
            .call("GetFlow", Method::GET, &["flows", flow_id, ""], None)
            .await?;

        let tags = match response.arn.as_deref() {
            Some(arn) => self.list_tags(arn).await.unwrap_or_else(|e| {
                tracing::warn!("could not read tags for {}: {}", arn, e);
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };

        Ok(FlowDetails {
            id: response.id,
            name: response.name,
            description: response.description.unwrap_or_default(),
            definition: response.definition.unwrap_or(Value::Null),
            execution_role_arn: response.execution_role_arn,
            status: response.status,
            tags,
        })
    }

    async fn delete_flow_alias(&self, flow_id: &str, alias_id: &str) -> Result<()> {
        let _: Value = self
            .call(
                "DeleteFlowAlias",
                Method::DELETE,
                &["flows", flow_id, "aliases", alias_id],
                None,
            )
            .await?;
        Ok(())
    }

    async fn delete_flow_version(&self, flow_id: &str, version: &str) -> Result<()> {
        let _: Value = self
            .call(
                "DeleteFlowVersion",
                Method::DELETE,
                &["flows", flow_id, "versions", version, ""],
                None,
            )
            .await?;
        Ok(())
    }

    async fn delete_flow(&self, flow_id: &str) -> Result<()> {
        let _: Value = self
            .call("DeleteFlow", Method::DELETE, &["flows", flow_id, ""], None)
            .await?;
        Ok(())
    }
}
