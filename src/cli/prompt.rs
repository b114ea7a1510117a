//! Line-oriented user input
//!
//! Every interactive read goes through [`Prompter`], so template value
//! collection, template selection, and multi-turn replies can be scripted.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use crate::cli::console::Console;
use crate::core::{FlowError, Result};

/// Source of interactive input lines
pub trait Prompter: Send {
    /// Show `prompt` and block until a line is entered; the trailing newline is removed
    fn read_line(&mut self, console: &mut Console, prompt: &str) -> Result<String>;
}

/// Reads from the process stdin
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn read_line(&mut self, console: &mut Console, prompt: &str) -> Result<String> {
        console.prompt(prompt)?;

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input)? {
            // EOF (Ctrl+D)
            0 => Err(FlowError::InputClosed),
            _ => Ok(input.trim_end_matches(&['\r', '\n'][..]).to_string()),
        }
    }
}

/// Replays canned answers and records every prompt it was shown
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    /// Create a prompter that answers with `answers` in order
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, console: &mut Console, prompt: &str) -> Result<String> {
        console.prompt(prompt)?;
        self.prompts.push(prompt.to_string());
        let answer = self.answers.pop_front().ok_or(FlowError::InputClosed)?;
        console.raw(&answer);
        Ok(answer)
    }
}
