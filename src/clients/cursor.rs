use super::JsonAgent;
use crate::config::Environment;
use std::path::PathBuf;

/// Cursor reads global MCP servers from `~/.cursor/mcp.json` on every platform.
pub struct Cursor;

impl JsonAgent for Cursor {
    fn id(&self) -> &'static str {
        "cursor"
    }

    fn name(&self) -> &'static str {
        "Cursor"
    }

    fn config_path(&self, env: &Environment) -> PathBuf {
        env.home_path(".cursor").join("mcp.json")
    }
}
