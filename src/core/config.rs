//! Configuration management for bedrock-flows
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/bedrock-flows/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{FlowError, Result};

/// Region used when neither the environment nor the config file names one
pub const FALLBACK_REGION: &str = "us-west-2";

/// Profile used when neither the environment nor the config file names one
pub const FALLBACK_PROFILE: &str = "default";

/// Main configuration for bedrock-flows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// AWS session configuration
    #[serde(default)]
    pub aws: AwsConfig,
    /// Template discovery
    #[serde(default)]
    pub templates: TemplatesConfig,
    /// Flow resource naming and invocation defaults
    #[serde(default)]
    pub flow: FlowConfig,
}

/// AWS session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Region for every client
    pub region: String,
    /// Named profile from the shared AWS config files
    pub profile: String,
}

/// Template discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory scanned for `*.json` templates
    pub dir: PathBuf,
    /// Case-insensitive file name marker that selects multivalued input
    pub multivalued_marker: String,
}

/// Flow resource configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// IAM role created or reused for flow execution
    pub role_name: String,
    /// Inline policy attached to a newly created role
    pub policy_name: String,
    /// Existing role to use instead of the managed one
    pub existing_role: Option<String>,
    /// Alias created for each prepared version
    pub alias_name: String,
    /// Entry node that receives the first turn of a test conversation
    pub input_node_name: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: env::var("AWS_REGION")
                .or_else(|_| env::var("AWS_DEFAULT_REGION"))
                .unwrap_or_else(|_| FALLBACK_REGION.to_string()),
            profile: env::var("AWS_PROFILE")
                .or_else(|_| env::var("AWS_DEFAULT_PROFILE"))
                .unwrap_or_else(|_| FALLBACK_PROFILE.to_string()),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: env::var("BEDROCK_FLOWS_TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./templates")),
            multivalued_marker: "iterator".to_string(),
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            role_name: "BedrockFlowsRole".to_string(),
            policy_name: "BedrockFlowsPolicy".to_string(),
            existing_role: None,
            alias_name: "latest".to_string(),
            input_node_name: "FlowInputNode".to_string(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bedrock-flows")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        match Self::load_from_file() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(FlowError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| FlowError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FlowError::config(format!("Failed to parse config: {}", e)))
    }

    /// Whether a template file name selects multivalued input
    pub fn is_multivalued_name(&self, name: &str) -> bool {
        name.to_lowercase()
            .contains(&self.templates.multivalued_marker.to_lowercase())
    }
}
