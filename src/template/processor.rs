//! Template processing
//!
//! Validates a template record, asks the user for a value for every
//! placeholder token, and returns the resolved definition and metadata.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::cli::console::{Console, Style};
use crate::cli::prompt::Prompter;
use crate::core::{Config, FlowError, Result, TemplateMetadata};
use crate::template::tokens;

/// Fields every template must carry, in reporting order
pub const REQUIRED_FIELDS: [&str; 3] = ["definition", "description", "name"];

/// Result of processing a template
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTemplate {
    /// Flow definition with every token replaced
    pub definition: Value,
    /// Whether the entry node takes a list of documents
    pub multivalued_input: bool,
    /// Name, description, tags, and execution role
    pub metadata: TemplateMetadata,
}

/// Resolves placeholder tokens in templates
pub struct TemplateProcessor<'a> {
    config: &'a Config,
}

impl<'a> TemplateProcessor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Process a parsed template
    ///
    /// `source_name` identifies the template (normally the file stem) and
    /// decides multivalued input mode.
    pub fn process(
        &self,
        template: &Value,
        source_name: &str,
        console: &mut Console,
        prompter: &mut dyn Prompter,
    ) -> Result<ProcessedTemplate> {
        validate(template)?;

        let metadata = serde_json::json!({
            "description": non_null(template, "description").unwrap_or_else(|| Value::from("")),
            "name": template.get("name").cloned().unwrap_or_default(),
            "tags": non_null(template, "tags").unwrap_or_else(|| serde_json::json!({})),
            "executionRoleArn": template.get("executionRoleArn").cloned().unwrap_or(Value::Null),
        });
        let definition = template.get("definition").cloned().unwrap_or_default();

        let definition_text = serde_json::to_string(&definition)?;
        let metadata_text = serde_json::to_string(&metadata)?;
        let multivalued_input = self.config.is_multivalued_name(source_name);

        let found = tokens::scan([definition_text.as_str(), metadata_text.as_str()]);
        if found.is_empty() {
            console.print(Style::Info, "No variables found in template");
            return Ok(ProcessedTemplate {
                definition,
                multivalued_input,
                metadata: parse_metadata(metadata)?,
            });
        }

        console.print(Style::Warning, "\nTemplate Variables Found:");
        console.rule(30);
        let ordered = tokens::presentation_order(&found);
        for token in &ordered {
            console.print(Style::Info, format!("• {}", token));
        }

        console.print(Style::Step, "\n🔄 Variable Replacement");
        console.print(Style::Info, "Enter values for each variable:");
        let replacements = collect_values(&ordered, console, prompter)?;

        let definition = reparse(
            &tokens::substitute(&definition_text, &replacements),
            "definition",
        )?;
        let metadata = parse_metadata(reparse(
            &tokens::substitute(&metadata_text, &replacements),
            "metadata",
        )?)?;

        console.print(Style::Success, "\n✅ Template processing complete");
        print_metadata(console, &metadata);

        Ok(ProcessedTemplate {
            definition,
            multivalued_input,
            metadata,
        })
    }
}

/// Field value, with an explicit `null` treated as absent
fn non_null(template: &Value, field: &str) -> Option<Value> {
    template.get(field).filter(|v| !v.is_null()).cloned()
}

/// Check required fields, reporting every missing one at once
pub fn validate(template: &Value) -> Result<()> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| template.get(**field).is_none())
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FlowError::MissingField(missing))
    }
}

fn collect_values(
    ordered: &[String],
    console: &mut Console,
    prompter: &mut dyn Prompter,
) -> Result<BTreeMap<String, String>> {
    let mut replacements = BTreeMap::new();
    for token in ordered {
        loop {
            let value = prompter.read_line(console, &format!("Enter value for {}: ", token))?;
            let value = value.trim();
            if !value.is_empty() {
                replacements.insert(token.clone(), value.to_string());
                break;
            }
            console.print(Style::Error, "Value cannot be empty! Please try again.");
        }
    }
    Ok(replacements)
}

fn reparse(text: &str, part: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| FlowError::substitution(format!("{}: {}", part, e)))
}

fn parse_metadata(value: Value) -> Result<TemplateMetadata> {
    serde_json::from_value(value).map_err(|e| FlowError::substitution(format!("metadata: {}", e)))
}

/// Print template metadata the way it will be sent to the service
pub fn print_metadata(console: &mut Console, metadata: &TemplateMetadata) {
    console.print(Style::Info, "\nTemplate Metadata:");
    console.print(Style::Info, format!("  • Name: {}", metadata.name));
    console.print(Style::Info, format!("  • Description: {}", metadata.description));
    if !metadata.tags.is_empty() {
        console.print(Style::Info, "  • Tags:");
        for (key, value) in &metadata.tags {
            console.print(Style::Info, format!("    - {}: {}", key, value));
        }
    }
}
