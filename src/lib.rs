//! Bedrock Flows - deploy and test Amazon Bedrock Flows from JSON templates
//!
//! Picks a template, fills in its `$$TOKEN` placeholders interactively,
//! creates and prepares the flow, and optionally runs a multi-turn test
//! conversation against it before cleaning up.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Template**: Template discovery, selection, and token substitution
//! - **Bedrock**: Service traits with IAM, control-plane, and runtime clients
//! - **Flow**: Deployment lifecycle, invocation loop, and export
//! - **CLI**: Console output, prompting, and response rendering
//!
//! # Usage
//!
//! ```rust,no_run
//! use bedrock_flows::bedrock;
//! use bedrock_flows::cli::{Console, StdinPrompter};
//! use bedrock_flows::{Config, DeployOptions, FlowManager};
//!
//! #[tokio::main]
//! async fn main() -> bedrock_flows::Result<()> {
//!     let config = Config::load();
//!     let backends = bedrock::connect(&config).await?;
//!     let mut manager =
//!         FlowManager::new(backends, config, Console::stdout(), Box::new(StdinPrompter));
//!
//!     manager.ensure_role().await?;
//!     if let Some(path) = manager.choose_template()? {
//!         let processed = manager.process_template(&path)?;
//!         manager.deploy(&processed, &DeployOptions::default()).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod bedrock;
pub mod cli;
pub mod core;
pub mod flow;
pub mod template;

// Re-export commonly used items
pub use core::{Config, FlowError, Result};
pub use flow::{DeployOptions, Deployment, FlowManager};
