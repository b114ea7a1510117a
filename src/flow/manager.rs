//! Flow manager - drives a template from selection to a tested deployment
//!
//! Each step prints its progress through the manager's [`Console`] and talks
//! to the remote service only through the traits in [`crate::bedrock`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::bedrock::traits::{CreateFlowRequest, FlowControlPlane, FlowRuntime, RoleProvider};
use crate::bedrock::Backends;
use crate::cli::console::{Console, Style};
use crate::cli::prompt::Prompter;
use crate::core::{Config, FlowTemplate, InputContent, Result, TemplateMetadata};
use crate::flow::conversation::Conversation;
use crate::flow::invocation::InvocationLoop;
use crate::flow::lifecycle::{CreatedResources, FlowLifecycle};
use crate::flow::payload::TurnInput;
use crate::template::{self, ProcessedTemplate, TemplateProcessor};

/// Options for a single deployment
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Overrides the template's flow name
    pub flow_name: Option<String>,
    /// First turn of the test conversation; no test when absent
    pub test_input: Option<InputContent>,
    /// Delete the created resources after a successful run
    pub cleanup: bool,
}

/// What a deployment produced
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub flow_id: String,
    pub version: String,
    pub alias_id: String,
    /// Final output of the test conversation, if one ran
    pub output: Option<Value>,
    /// Whether cleanup ran and every created resource was deleted
    pub cleaned_up: bool,
}

/// Prepared version and the alias routing to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedFlow {
    pub version: String,
    pub alias_id: String,
}

/// Coordinates role setup, template processing, deployment, testing and export
pub struct FlowManager {
    roles: Arc<dyn RoleProvider>,
    control_plane: Arc<dyn FlowControlPlane>,
    runtime: Arc<dyn FlowRuntime>,
    config: Config,
    console: Console,
    prompter: Box<dyn Prompter>,
    role_arn: Option<String>,
    /// Turns of the last test conversation
    last_conversation: Option<Conversation>,
}

impl FlowManager {
    /// Create a manager over the given backends
    pub fn new(
        backends: Backends,
        config: Config,
        console: Console,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        Self {
            roles: backends.roles,
            control_plane: backends.control_plane,
            runtime: backends.runtime,
            config,
            console,
            prompter,
            role_arn: None,
            last_conversation: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn console(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Role ARN resolved by [`FlowManager::ensure_role`]
    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref()
    }

    /// Conversation from the most recent [`FlowManager::test_flow`] call
    pub fn last_conversation(&self) -> Option<&Conversation> {
        self.last_conversation.as_ref()
    }

    /// Resolve the execution role, creating the managed role if needed
    pub async fn ensure_role(&mut self) -> Result<String> {
        self.console.step("🔑 Step 1: Setting up IAM Role");

        let existing = self.config.flow.existing_role.clone();
        let arn = match self.roles.ensure_role(existing.as_deref()).await {
            Ok(arn) => arn,
            Err(e) => {
                self.console
                    .print(Style::Error, format!("❌ Error setting up IAM role: {}", e));
                return Err(e);
            }
        };

        let name = existing.unwrap_or_else(|| self.config.flow.role_name.clone());
        self.console
            .print(Style::Info, format!("Using IAM role: {}", name));
        self.console.print(Style::Info, format!("Role ARN: {}", arn));
        self.role_arn = Some(arn.clone());
        Ok(arn)
    }

    /// List templates and let the user pick one; `None` when there is nothing to pick
    pub fn choose_template(&mut self) -> Result<Option<PathBuf>> {
        let dir = self.config.templates.dir.clone();
        let templates = template::list_templates(&dir, &mut self.console)?;
        if templates.is_empty() {
            return Ok(None);
        }
        template::select_template(&templates, &mut self.console, self.prompter.as_mut())
    }

    /// Load a template file and resolve its tokens
    pub fn process_template(&mut self, path: &Path) -> Result<ProcessedTemplate> {
        self.console.step("📝 Step 2: Processing Template");
        self.console
            .print(Style::Info, format!("Loading template: {}", path.display()));

        let raw = template::load_template(path)?;
        let name = template::template_name(path);
        TemplateProcessor::new(&self.config).process(
            &raw,
            &name,
            &mut self.console,
            self.prompter.as_mut(),
        )
    }

    /// Create a flow from a processed definition; returns the flow id
    pub async fn create_flow(
        &mut self,
        definition: &Value,
        metadata: &TemplateMetadata,
        flow_name: Option<&str>,
    ) -> Result<String> {
        self.console.step("🚀 Step 3: Creating Flow");

        let name = flow_name.unwrap_or(&metadata.name).to_string();
        self.console
            .print(Style::Info, format!("Creating flow: {}", name));
        if flow_name.is_none() {
            self.console.print(Style::Info, "Using flow name from template");
        }

        let execution_role_arn = match metadata.execution_role_arn.clone() {
            Some(arn) => arn,
            None => match self.role_arn.clone() {
                Some(arn) => arn,
                None => self.ensure_role().await?,
            },
        };

        let request = CreateFlowRequest {
            name: name.clone(),
            description: metadata.description.clone(),
            definition: definition.clone(),
            execution_role_arn,
            tags: metadata.tags.clone(),
        };

        match self.control_plane.create_flow(&request).await {
            Ok(flow_id) => {
                self.console.print(Style::Success, "✅ Flow created successfully!");
                self.console.print(Style::Info, format!("Flow ID: {}", flow_id));
                self.console.print(Style::Info, format!("Flow Name: {}", name));
                Ok(flow_id)
            }
            Err(e) => {
                self.console
                    .print(Style::Error, format!("❌ Error creating flow: {}", e));
                Err(e)
            }
        }
    }

    /// Prepare the draft, snapshot a version and point the alias at it
    ///
    /// Each identifier is written to `created` as soon as it exists, so a
    /// failure part way through still leaves enough to clean up.
    pub async fn prepare_flow(
        &mut self,
        flow_id: &str,
        created: &mut CreatedResources,
    ) -> Result<PreparedFlow> {
        self.console.step("⚙️ Step 4: Preparing Flow");

        let result = self.prepare_steps(flow_id, created).await;
        match &result {
            Ok(prepared) => {
                self.console
                    .print(Style::Success, "\n✅ Flow preparation complete!");
                self.console.print(Style::Info, "Flow Details:");
                self.console
                    .print(Style::Info, format!("  • Version: {}", prepared.version));
                self.console
                    .print(Style::Info, format!("  • Alias ID: {}", prepared.alias_id));
            }
            Err(e) => self
                .console
                .print(Style::Error, format!("❌ Error preparing flow: {}", e)),
        }
        result
    }

    async fn prepare_steps(
        &mut self,
        flow_id: &str,
        created: &mut CreatedResources,
    ) -> Result<PreparedFlow> {
        self.console.print(Style::Info, "Preparing flow...");
        self.control_plane.prepare_flow(flow_id).await?;

        self.console.print(Style::Info, "Creating flow version...");
        let version = self.control_plane.create_flow_version(flow_id).await?;
        created.version = Some(version.clone());
        self.console
            .print(Style::Success, format!("Created version: {}", version));

        self.console.print(Style::Info, "Creating flow alias...");
        let alias_id = self
            .control_plane
            .create_flow_alias(flow_id, &self.config.flow.alias_name, &version)
            .await?;
        created.alias_id = Some(alias_id.clone());

        Ok(PreparedFlow { version, alias_id })
    }

    /// Run a test conversation against a prepared flow; returns the final output
    pub async fn test_flow(
        &mut self,
        flow_id: &str,
        alias_id: &str,
        input: InputContent,
        multivalued: bool,
    ) -> Result<Value> {
        self.console.step("🧪 Step 5: Testing Flow");

        let mut conversation = Conversation::new(flow_id, alias_id);
        let first = TurnInput::initial(input, self.config.flow.input_node_name.clone());
        let result = InvocationLoop::new(
            self.runtime.as_ref(),
            &mut self.console,
            self.prompter.as_mut(),
            multivalued,
        )
        .run(&mut conversation, first)
        .await;

        if let Err(e) = &result {
            self.console
                .print(Style::Error, format!("❌ Error testing flow: {}", e));
        }
        tracing::debug!(turns = conversation.len(), "test conversation finished");
        self.last_conversation = Some(conversation);
        result
    }

    /// Create, prepare and optionally test a flow, cleaning up on failure
    ///
    /// The original error is returned after cleanup.
    pub async fn deploy(
        &mut self,
        processed: &ProcessedTemplate,
        options: &DeployOptions,
    ) -> Result<Deployment> {
        let mut lifecycle = FlowLifecycle::new(Arc::clone(&self.control_plane));
        let result = self
            .deploy_steps(processed, options, lifecycle.resources_mut())
            .await;
        let outcome = lifecycle
            .finish(&mut self.console, result, options.cleanup)
            .await;
        let cleaned_up = outcome.cleaned_up();
        let mut deployment = outcome.result?;
        deployment.cleaned_up = cleaned_up;
        Ok(deployment)
    }

    async fn deploy_steps(
        &mut self,
        processed: &ProcessedTemplate,
        options: &DeployOptions,
        created: &mut CreatedResources,
    ) -> Result<Deployment> {
        let flow_id = self
            .create_flow(
                &processed.definition,
                &processed.metadata,
                options.flow_name.as_deref(),
            )
            .await?;
        created.flow_id = Some(flow_id.clone());

        let prepared = self.prepare_flow(&flow_id, created).await?;

        let output = match options.test_input.clone() {
            Some(input) => Some(
                self.test_flow(
                    &flow_id,
                    &prepared.alias_id,
                    input,
                    processed.multivalued_input,
                )
                .await?,
            ),
            None => None,
        };

        Ok(Deployment {
            flow_id,
            version: prepared.version,
            alias_id: prepared.alias_id,
            output,
            cleaned_up: false,
        })
    }

    /// Default export location for a flow name
    pub fn export_path(&self, flow_name: &str) -> PathBuf {
        let stem = flow_name.to_lowercase().replace(' ', "_");
        self.config
            .templates
            .dir
            .join(format!("{}_exported.json", stem))
    }

    /// Write a flow's definition back out as a template file
    pub async fn export_flow(
        &mut self,
        flow_id: &str,
        output: Option<&Path>,
    ) -> Result<(PathBuf, FlowTemplate)> {
        self.console.step("📤 Exporting Flow Definition");

        let result = self.export_steps(flow_id, output).await;
        if let Err(e) = &result {
            self.console.print(
                Style::Error,
                format!("❌ Error exporting flow definition: {}", e),
            );
        }
        result
    }

    async fn export_steps(
        &mut self,
        flow_id: &str,
        output: Option<&Path>,
    ) -> Result<(PathBuf, FlowTemplate)> {
        let details = self.control_plane.get_flow(flow_id).await?;
        let exported = FlowTemplate {
            name: details.name,
            description: details.description,
            definition: details.definition,
            tags: details.tags,
            execution_role_arn: details.execution_role_arn,
        };

        let path = match output {
            Some(path) => path.to_path_buf(),
            None => self.export_path(&exported.name),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(&exported)?)?;

        self.console.print(
            Style::Success,
            format!("✅ Flow definition exported successfully to: {}", path.display()),
        );
        self.console.print(Style::Info, "\nExported Flow Details:");
        self.console
            .print(Style::Info, format!("  • Name: {}", exported.name));
        self.console
            .print(Style::Info, format!("  • Description: {}", exported.description));
        if !exported.tags.is_empty() {
            self.console.print(Style::Info, "  • Tags:");
            for (key, value) in &exported.tags {
                self.console
                    .print(Style::Info, format!("    - {}: {}", key, value));
            }
        }

        Ok((path, exported))
    }
}

