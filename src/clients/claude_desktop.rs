use super::JsonAgent;
use crate::config::Environment;
use std::path::PathBuf;

/// Claude Desktop keeps MCP servers in `claude_desktop_config.json` under the
/// per-user application directory.
pub struct ClaudeDesktop;

impl JsonAgent for ClaudeDesktop {
    fn id(&self) -> &'static str {
        "claude-desktop"
    }

    fn name(&self) -> &'static str {
        "Claude Desktop"
    }

    fn config_path(&self, env: &Environment) -> PathBuf {
        env.app_config_dir()
            .join("Claude")
            .join("claude_desktop_config.json")
    }
}
