//! Agent clients that know how to register the CodeAlive MCP server.
//!
//! # Architecture
//!
//! Every supported agent is exposed through the [`Client`] trait:
//! - **detect**: is the agent present on this machine?
//! - **check**: is the `codealive` server already registered?
//! - **add** / **remove**: change the registration
//!
//! Agents come in two families:
//! - [`JsonAgent`]s describe a config file, the property holding MCP servers,
//!   and the entry shape; [`JsonClient`] does the file work.
//! - [`CliAgent`]s describe an executable with `mcp add/list/remove`
//!   subcommands; [`CliClient`] locates and drives it.
//!
//! The set of agents is fixed; see [`registry::ClientRegistry`].

pub mod claude_code;
pub mod claude_desktop;
pub mod command_line;
pub mod cursor;
pub mod gemini;
pub mod json;
pub mod opencode;
pub mod registry;
pub mod vscode;
pub mod vscode_extensions;
pub mod windsurf;
pub mod zed;

pub use command_line::{CliAgent, CliClient};
pub use json::{JsonAgent, JsonClient};
pub use registry::ClientRegistry;

use crate::config::{Environment, API_KEY_ENV, BASE_URL_ENV};
use crate::error::Result;
use serde_json::{json, Map, Value};

/// Key identifying our entry inside every agent config
pub const SERVER_NAME: &str = "codealive";

/// Executable that launches the MCP server
pub const LAUNCH_COMMAND: &str = "uvx";

/// Arguments passed to [`LAUNCH_COMMAND`]
pub const LAUNCH_ARGS: &[&str] = &["codealive-mcp"];

/// Uniform contract over every supported agent.
///
/// Operations never panic and never print: failures come back as `Err` so the
/// installer can report them per agent and move on.
pub trait Client {
    /// Short identifier accepted by `--agent`
    fn id(&self) -> &'static str;

    /// Display name
    fn name(&self) -> &'static str;

    /// Whether the agent appears to be installed. Has no side effects.
    fn is_client_supported(&self) -> bool;

    /// Whether the `codealive` server is registered. Never fails; anything
    /// unreadable counts as not installed.
    fn is_server_installed(&self) -> bool;

    /// Register (or re-register) the server with the given API key.
    fn add_server(&self, api_key: &str) -> Result<()>;

    /// Remove the registration.
    fn remove_server(&self) -> Result<()>;
}

/// Environment variables handed to the MCP server process.
///
/// The base URL is present only when a self-hosted URL is configured.
pub fn server_env(api_key: &str, env: &Environment) -> Map<String, Value> {
    let mut vars = Map::new();
    vars.insert(API_KEY_ENV.to_string(), Value::from(api_key));
    if let Some(base_url) = env.base_url.as_deref().filter(|url| !url.is_empty()) {
        vars.insert(BASE_URL_ENV.to_string(), Value::from(base_url));
    }
    vars
}

/// The `{command, args, env}` entry most agents understand.
pub fn standard_entry(api_key: &str, env: &Environment) -> Value {
    json!({
        "command": LAUNCH_COMMAND,
        "args": LAUNCH_ARGS,
        "env": server_env(api_key, env),
    })
}

/// `uvx codealive-mcp` as a list of program arguments.
pub fn launch_command_line() -> Vec<String> {
    std::iter::once(LAUNCH_COMMAND)
        .chain(LAUNCH_ARGS.iter().copied())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Platform;

    #[test]
    fn test_standard_entry() {
        let env = Environment::with_home(Platform::Linux, "/home/me");
        let entry = standard_entry("test-key", &env);
        assert_eq!(entry["command"], "uvx");
        assert_eq!(entry["args"], json!(["codealive-mcp"]));
        assert_eq!(entry["env"]["CODEALIVE_API_KEY"], "test-key");
        assert!(entry["env"].get("CODEALIVE_BASE_URL").is_none());
    }

    #[test]
    fn test_server_env_with_base_url() {
        let mut env = Environment::with_home(Platform::Linux, "/home/me");
        env.base_url = Some("https://self-hosted.example.com".to_string());
        let vars = server_env("k", &env);
        assert_eq!(vars["CODEALIVE_BASE_URL"], "https://self-hosted.example.com");

        env.base_url = Some(String::new());
        assert!(!server_env("k", &env).contains_key("CODEALIVE_BASE_URL"));
    }

    #[test]
    fn test_launch_command_line() {
        assert_eq!(launch_command_line(), vec!["uvx", "codealive-mcp"]);
    }
}
