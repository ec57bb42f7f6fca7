//! Terminal prompts for the interactive installer.
//!
//! The orchestrator talks to a [`Prompter`] so runs can be scripted in tests.
//! Every cancellation (Esc, Ctrl-C) becomes [`InstallerError::CancelledByUser`].

use crate::error::{InstallerError, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, MultiSelect, Password};

pub trait Prompter {
    /// Ask for the API key with hidden input. Never returns an empty key.
    fn api_key(&self) -> Result<String>;

    /// Pick a subset of `items`, all preselected. Returns selected indices.
    fn select(&self, prompt: &str, items: &[String]) -> Result<Vec<usize>>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn api_key(&self) -> Result<String> {
        loop {
            let key = Password::with_theme(&self.theme)
                .with_prompt("CodeAlive API key")
                .interact()?;
            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
            println!("API key cannot be empty");
        }
    }

    fn select(&self, prompt: &str, items: &[String]) -> Result<Vec<usize>> {
        let defaults = vec![true; items.len()];
        MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .defaults(&defaults)
            .interact_opt()?
            .ok_or(InstallerError::CancelledByUser)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()?
            .ok_or(InstallerError::CancelledByUser)
    }
}

/// Answers every prompt from a fixed script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    pub api_key: Option<String>,
    /// Indices to select; `None` keeps the preselected "everything"
    pub selection: Option<Vec<usize>>,
    pub confirm: bool,
}

impl Prompter for ScriptedPrompter {
    fn api_key(&self) -> Result<String> {
        self.api_key.clone().ok_or(InstallerError::CancelledByUser)
    }

    fn select(&self, _prompt: &str, items: &[String]) -> Result<Vec<usize>> {
        Ok(self
            .selection
            .clone()
            .unwrap_or_else(|| (0..items.len()).collect()))
    }

    fn confirm(&self, _prompt: &str, _default: bool) -> Result<bool> {
        Ok(self.confirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_selects_everything_by_default() {
        let prompter = ScriptedPrompter::default();
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(prompter.select("pick", &items).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_scripted_missing_key_cancels() {
        let err = ScriptedPrompter::default().api_key().unwrap_err();
        assert!(matches!(err, InstallerError::CancelledByUser));
    }
}
