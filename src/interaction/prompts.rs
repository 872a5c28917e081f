//! User prompting implementation

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::{self, BufRead, Write};

/// Trait for user prompting
#[async_trait]
pub trait UserPrompter: Send + Sync {
    /// Prompt for yes/no confirmation; empty input takes `default`
    async fn prompt_yes_no(&self, message: &str, default: bool) -> Result<bool>;

    /// Prompt for text input
    async fn prompt_text(&self, message: &str, default: Option<&str>) -> Result<String>;
}

/// Prompter reading answers from stdin
pub struct UserPrompterImpl;

impl Default for UserPrompterImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl UserPrompterImpl {
    pub fn new() -> Self {
        Self
    }

    fn read_line() -> Result<String> {
        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Err(Error::Prompt("stdin closed before an answer was given".to_string()));
        }
        Ok(input.trim().to_string())
    }

    /// Interpret a yes/no answer; `None` for anything unrecognized
    pub fn parse_yes_no(input: &str, default: bool) -> Option<bool> {
        match input.trim().to_lowercase().as_str() {
            "" => Some(default),
            "y" | "yes" => Some(true),
            "n" | "no" => Some(false),
            _ => None,
        }
    }

    pub fn format_yes_no_prompt(message: &str, default: bool) -> String {
        if default {
            format!("{message} [Y/n]: ")
        } else {
            format!("{message} [y/N]: ")
        }
    }
}

#[async_trait]
impl UserPrompter for UserPrompterImpl {
    async fn prompt_yes_no(&self, message: &str, default: bool) -> Result<bool> {
        print!("{}", Self::format_yes_no_prompt(message, default));
        io::stdout().flush()?;

        loop {
            let input = Self::read_line()?;
            if let Some(answer) = Self::parse_yes_no(&input, default) {
                return Ok(answer);
            }
            print!("Please answer yes or no: ");
            io::stdout().flush()?;
        }
    }

    async fn prompt_text(&self, message: &str, default: Option<&str>) -> Result<String> {
        if let Some(default_value) = default {
            print!("{message} [{default_value}]: ");
        } else {
            print!("{message}: ");
        }
        io::stdout().flush()?;

        let input = Self::read_line()?;

        if input.is_empty() {
            Ok(default.map(str::to_string).unwrap_or(input))
        } else {
            Ok(input)
        }
    }
}

/// Prompter answering from a fixed script of responses
pub struct ScriptedPrompter {
    responses: std::sync::Mutex<Vec<String>>,
    asked: std::sync::Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut responses: Vec<String> = responses.into_iter().map(Into::into).collect();
        responses.reverse();
        Self {
            responses: std::sync::Mutex::new(responses),
            asked: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every prompt message shown so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn next(&self, message: &str) -> Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        self.responses
            .lock()
            .map_err(|_| Error::Prompt("prompt script poisoned".to_string()))?
            .pop()
            .ok_or_else(|| Error::Prompt(format!("no scripted answer for '{message}'")))
    }
}

#[async_trait]
impl UserPrompter for ScriptedPrompter {
    async fn prompt_yes_no(&self, message: &str, default: bool) -> Result<bool> {
        let answer = self.next(message)?;
        UserPrompterImpl::parse_yes_no(&answer, default)
            .ok_or_else(|| Error::Prompt(format!("'{answer}' is not a yes/no answer")))
    }

    async fn prompt_text(&self, message: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next(message)?;
        if answer.is_empty() {
            Ok(default.map(str::to_string).unwrap_or(answer))
        } else {
            Ok(answer)
        }
    }
}
