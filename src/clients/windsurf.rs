use super::JsonAgent;
use crate::config::Environment;
use std::path::PathBuf;

/// Windsurf (Codeium)
pub struct Windsurf;

impl JsonAgent for Windsurf {
    fn id(&self) -> &'static str {
        "windsurf"
    }

    fn name(&self) -> &'static str {
        "Windsurf"
    }

    fn config_path(&self, env: &Environment) -> PathBuf {
        env.home_path(".codeium")
            .join("windsurf")
            .join("mcp_config.json")
    }
}
