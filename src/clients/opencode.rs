use super::{launch_command_line, server_env, JsonAgent};
use crate::config::Environment;
use serde_json::{json, Value};
use std::path::PathBuf;

/// OpenCode lists MCP servers under `mcp`, with the command as a single array
/// and variables under `environment`.
pub struct OpenCode;

impl JsonAgent for OpenCode {
    fn id(&self) -> &'static str {
        "opencode"
    }

    fn name(&self) -> &'static str {
        "OpenCode"
    }

    fn config_path(&self, env: &Environment) -> PathBuf {
        env.xdg_config_dir().join("opencode").join("opencode.json")
    }

    fn server_property_key(&self) -> &'static str {
        "mcp"
    }

    fn server_entry(&self, api_key: &str, env: &Environment) -> Value {
        json!({
            "type": "local",
            "command": launch_command_line(),
            "enabled": true,
            "environment": server_env(api_key, env),
        })
    }
}
