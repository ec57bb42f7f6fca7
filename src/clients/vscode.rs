use super::{server_env, JsonAgent, LAUNCH_ARGS, LAUNCH_COMMAND};
use crate::config::Environment;
use serde_json::{json, Value};
use std::path::PathBuf;

/// VS Code user directory (`Code/User`) holding settings and extension storage.
pub fn user_dir(env: &Environment) -> PathBuf {
    env.app_config_dir().join("Code").join("User")
}

/// VS Code native MCP support: `servers` in the user-level `mcp.json`.
pub struct VsCode;

impl JsonAgent for VsCode {
    fn id(&self) -> &'static str {
        "vscode"
    }

    fn name(&self) -> &'static str {
        "VS Code"
    }

    fn config_path(&self, env: &Environment) -> PathBuf {
        user_dir(env).join("mcp.json")
    }

    fn server_property_key(&self) -> &'static str {
        "servers"
    }

    fn server_entry(&self, api_key: &str, env: &Environment) -> Value {
        json!({
            "type": "stdio",
            "command": LAUNCH_COMMAND,
            "args": LAUNCH_ARGS,
            "env": server_env(api_key, env),
        })
    }
}
