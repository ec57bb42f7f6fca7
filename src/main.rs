#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use codealive_installer::cli::Cli;
use codealive_installer::clients::ClientRegistry;
use codealive_installer::commands::{self, Session};
use codealive_installer::config::{Config, Environment};
use codealive_installer::credentials::CredentialStore;
use codealive_installer::error::InstallerError;
use codealive_installer::prompt::TerminalPrompter;
use codealive_installer::verify;

fn main() -> Result<()> {
    let config = Cli::parse().into_config();
    init_tracing(&config);

    match run(&config) {
        Ok(()) => Ok(()),
        Err(InstallerError::CancelledByUser) => {
            eprintln!("Installation cancelled");
            std::process::exit(130);
        }
        Err(e @ (InstallerError::MissingApiKey | InstallerError::InvalidApiKey(_))) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn run(config: &Config) -> codealive_installer::error::Result<()> {
    let env = Environment::detect()?;
    tracing::debug!(platform = ?env.platform, home = %env.home.display(), "environment");

    let registry = ClientRegistry::new(&env);
    let credentials = CredentialStore::detect(&env);
    let prompter = TerminalPrompter::new();
    let session = Session {
        config,
        env: &env,
        registry: &registry,
        credentials: &credentials,
        prompter: &prompter,
    };

    if config.uninstall {
        commands::uninstall::execute(&session)?;
    } else {
        commands::install::execute(&session, verify::verify_api_key)?;
    }
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = if config.debug {
        EnvFilter::new("codealive_installer=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
