//! Template module - loading, selection, and placeholder substitution

pub mod library;
pub mod processor;
pub mod tokens;

pub use library::{list_templates, load_template, select_template, template_name};
pub use processor::{ProcessedTemplate, TemplateProcessor};
