//! Template discovery and selection

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::cli::console::{Console, Style};
use crate::cli::prompt::Prompter;
use crate::core::{FlowError, Result};

/// List `*.json` templates in `dir`, sorted by file name
///
/// A missing directory is created and yields no templates.
pub fn list_templates(dir: &Path, console: &mut Console) -> Result<Vec<PathBuf>> {
    console.print(Style::Step, "\n📂 Available Templates:");
    console.rule(50);

    if !dir.exists() {
        console.print(
            Style::Warning,
            format!("Creating templates directory: {}", dir.display()),
        );
        fs::create_dir_all(dir)?;
        return Ok(Vec::new());
    }

    let mut templates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json")
        })
        .collect();
    templates.sort();

    if templates.is_empty() {
        console.print(
            Style::Warning,
            "No templates found! Please add JSON templates to the templates directory.",
        );
        return Ok(templates);
    }

    for (idx, template) in templates.iter().enumerate() {
        let description = read_description(template)
            .unwrap_or_else(|| "Unable to read template description".to_string());
        let name = template
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        console.print(Style::Info, format!("{}. {}", idx + 1, name));
        console.print(Style::Info, format!("      Description: {}", description));
        console.rule(50);
    }

    Ok(templates)
}

fn read_description(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let value: Value = serde_json::from_str(&content).ok()?;
    Some(
        value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("No description available")
            .to_string(),
    )
}

/// Ask the user to pick a template by number; `q` quits with no selection
pub fn select_template(
    templates: &[PathBuf],
    console: &mut Console,
    prompter: &mut dyn Prompter,
) -> Result<Option<PathBuf>> {
    if templates.is_empty() {
        return Ok(None);
    }

    loop {
        console.print(Style::Input, "\nSelect a template number:");
        let choice = prompter.read_line(console, "Enter number (or 'q' to quit): ")?;
        let choice = choice.trim();

        if choice.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        match choice.parse::<usize>() {
            Ok(n) if (1..=templates.len()).contains(&n) => {
                return Ok(Some(templates[n - 1].clone()));
            }
            Ok(_) => console.print(Style::Error, "Invalid selection! Please try again."),
            Err(_) => console.print(Style::Error, "Please enter a valid number!"),
        }
    }
}

/// Read and parse a template file
pub fn load_template(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(FlowError::TemplateNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Identifying name of a template file (its stem)
pub fn template_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
