//! Tracking and cleanup of the remote resources a deployment creates

use std::sync::Arc;

use crate::bedrock::traits::FlowControlPlane;
use crate::cli::console::{Console, Style};
use crate::core::Result;

/// Identifiers of the resources created so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedResources {
    pub flow_id: Option<String>,
    pub version: Option<String>,
    pub alias_id: Option<String>,
}

impl CreatedResources {
    pub fn is_empty(&self) -> bool {
        self.flow_id.is_none() && self.version.is_none() && self.alias_id.is_none()
    }

    fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(id) = &self.flow_id {
            lines.push(format!("Flow ID: {}", id));
        }
        if let Some(id) = &self.alias_id {
            lines.push(format!("Alias ID: {}", id));
        }
        if let Some(version) = &self.version {
            lines.push(format!("Version: {}", version));
        }
        lines
    }
}

/// Delete created resources in reverse order: alias, version, flow
///
/// Each deletion runs even if an earlier one failed. Failures are printed,
/// never returned. Returns `true` when every attempted deletion succeeded.
pub async fn cleanup_flow(
    control_plane: &dyn FlowControlPlane,
    console: &mut Console,
    resources: &CreatedResources,
) -> bool {
    console.step("🧹 Cleaning Up Resources");
    let mut clean = true;

    let Some(flow_id) = resources.flow_id.as_deref() else {
        console.print(Style::Info, "Nothing to clean up");
        return true;
    };

    if let Some(alias_id) = resources.alias_id.as_deref() {
        console.print(Style::Info, "1. Deleting flow alias...");
        match control_plane.delete_flow_alias(flow_id, alias_id).await {
            Ok(()) => console.print(Style::Success, "   ✅ Alias deleted"),
            Err(e) => {
                clean = false;
                console.print(Style::Warning, format!("   ⚠️  Error deleting alias: {}", e));
            }
        }
    }

    if let Some(version) = resources.version.as_deref() {
        console.print(Style::Info, "2. Deleting flow version...");
        match control_plane.delete_flow_version(flow_id, version).await {
            Ok(()) => console.print(Style::Success, "   ✅ Version deleted"),
            Err(e) => {
                clean = false;
                console.print(Style::Warning, format!("   ⚠️  Error deleting version: {}", e));
            }
        }
    }

    console.print(Style::Info, "3. Deleting flow...");
    match control_plane.delete_flow(flow_id).await {
        Ok(()) => console.print(Style::Success, "   ✅ Flow deleted"),
        Err(e) => {
            clean = false;
            console.print(Style::Warning, format!("   ⚠️  Error deleting flow: {}", e));
        }
    }

    if clean {
        console.print(Style::Success, "\n✨ Cleanup completed");
    } else {
        console.print(
            Style::Warning,
            "\nSome resources may need to be cleaned up manually:",
        );
        for line in resources.describe() {
            console.print(Style::Warning, format!("  • {}", line));
        }
    }
    clean
}

/// What [`FlowLifecycle::finish`] did
#[derive(Debug)]
pub struct LifecycleOutcome<T> {
    /// The result handed to `finish`, unchanged
    pub result: Result<T>,
    /// `None` when no cleanup ran, otherwise whether every deletion succeeded
    pub cleanup: Option<bool>,
}

impl<T> LifecycleOutcome<T> {
    pub fn cleaned_up(&self) -> bool {
        self.cleanup == Some(true)
    }
}

/// Guard over a deployment in progress
///
/// Record each resource as soon as it exists, then hand the outcome to
/// [`FlowLifecycle::finish`].
pub struct FlowLifecycle {
    control_plane: Arc<dyn FlowControlPlane>,
    resources: CreatedResources,
    finished: bool,
}

impl FlowLifecycle {
    pub fn new(control_plane: Arc<dyn FlowControlPlane>) -> Self {
        Self {
            control_plane,
            resources: CreatedResources::default(),
            finished: false,
        }
    }

    pub fn resources(&self) -> &CreatedResources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut CreatedResources {
        &mut self.resources
    }

    /// Clean up when `result` failed or cleanup was requested
    pub async fn finish<T>(
        mut self,
        console: &mut Console,
        result: Result<T>,
        cleanup_requested: bool,
    ) -> LifecycleOutcome<T> {
        self.finished = true;

        if let Err(e) = &result {
            tracing::warn!(error = %e, "deployment failed, removing created resources");
            console.print(Style::Error, format!("\n❌ Error in flow lifecycle: {}", e));
        }

        let cleanup = if result.is_err() || cleanup_requested {
            Some(cleanup_flow(self.control_plane.as_ref(), console, &self.resources).await)
        } else {
            None
        };
        LifecycleOutcome { result, cleanup }
    }
}

impl Drop for FlowLifecycle {
    fn drop(&mut self) {
        if !self.finished && !self.resources.is_empty() {
            tracing::warn!(
                resources = ?self.resources,
                "flow lifecycle dropped without finishing; resources left in place"
            );
        }
    }
}
