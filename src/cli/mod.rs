//! CLI module - terminal output and interactive input
//!
//! Contains styled console output, line prompting, and response rendering.

pub mod console;
pub mod prompt;
pub mod render;

pub use console::{Console, Style};
pub use prompt::{Prompter, ScriptedPrompter, StdinPrompter};
