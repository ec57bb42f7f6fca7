pub mod install;
pub mod uninstall;

use crate::clients::{Client, ClientRegistry};
use crate::config::{Config, Environment};
use crate::credentials::CredentialStore;
use crate::prompt::Prompter;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Everything a command needs, built once in `main`.
pub struct Session<'a> {
    pub config: &'a Config,
    pub env: &'a Environment,
    pub registry: &'a ClientRegistry,
    pub credentials: &'a CredentialStore,
    pub prompter: &'a dyn Prompter,
}

impl Session<'_> {
    /// A spinner on stderr, hidden in CI and debug runs so it does not
    /// interleave with log output.
    pub fn spinner(&self, message: impl Into<String>) -> ProgressBar {
        if !self.config.interactive() || self.config.debug {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(template);
        }
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }
}

/// Per-agent result of an add or remove.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub agent: &'static str,
    pub error: Option<String>,
}

impl AgentOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated results of one run, in the order agents were processed.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub outcomes: Vec<AgentOutcome>,
}

impl Report {
    pub fn record(&mut self, agent: &'static str, result: crate::error::Result<()>) {
        let error = result.err().map(|e| e.to_string());
        match &error {
            None => println!("  {} {}", style("✓").green(), agent),
            Some(message) => println!("  {} {}: {}", style("✗").red(), agent, message),
        }
        self.outcomes.push(AgentOutcome { agent, error });
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &AgentOutcome> {
        self.outcomes.iter().filter(|o| o.succeeded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &AgentOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Narrow `candidates` to the agents named on the command line.
///
/// Names that match a known but undetected agent, or no agent at all, are
/// reported and skipped.
pub(crate) fn filter_by_name<'a>(
    session: &Session,
    candidates: &[&'a dyn Client],
    names: &[String],
) -> Vec<&'a dyn Client> {
    let mut selected: Vec<&'a dyn Client> = Vec::new();
    for name in names {
        match candidates
            .iter()
            .find(|client| crate::clients::registry::matches_name(**client, name))
        {
            Some(client) => {
                if !selected.iter().any(|s| s.id() == client.id()) {
                    selected.push(*client);
                }
            }
            None => match session.registry.find(name) {
                Some(known) => warn(&format!("{} is not available here, skipping", known.name())),
                None => warn(&format!("Unknown agent: {}", name)),
            },
        }
    }
    selected
}

pub(crate) fn warn(message: &str) {
    println!("{} {}", style("⚠").yellow(), message);
}
