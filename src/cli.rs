use crate::config::{Config, API_KEY_ENV};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "codealive-installer")]
#[command(about = "Install the CodeAlive MCP server into your AI coding agents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// CodeAlive API key
    #[arg(short = 'k', long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Non-interactive mode: never prompt, configure every detected agent
    #[arg(long)]
    pub ci: bool,

    /// Configure only this agent (id or name, repeatable)
    #[arg(long = "agent", value_name = "NAME")]
    pub agents: Vec<String>,

    /// Remove CodeAlive from every agent instead of adding it
    #[arg(long)]
    pub uninstall: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            api_key: self.api_key,
            ci: self.ci,
            debug: self.debug,
            agents: self.agents,
            uninstall: self.uninstall,
        }
    }
}
