use super::{server_env, JsonAgent, LAUNCH_ARGS, LAUNCH_COMMAND};
use crate::config::{Environment, Platform};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Zed stores context servers in its commented `settings.json`.
pub struct Zed;

impl JsonAgent for Zed {
    fn id(&self) -> &'static str {
        "zed"
    }

    fn name(&self) -> &'static str {
        "Zed"
    }

    fn config_path(&self, env: &Environment) -> PathBuf {
        match env.platform {
            Platform::Windows => env.app_config_dir().join("Zed").join("settings.json"),
            Platform::MacOs | Platform::Linux => {
                env.xdg_config_dir().join("zed").join("settings.json")
            }
        }
    }

    fn server_property_key(&self) -> &'static str {
        "context_servers"
    }

    fn server_entry(&self, api_key: &str, env: &Environment) -> Value {
        json!({
            "source": "custom",
            "command": LAUNCH_COMMAND,
            "args": LAUNCH_ARGS,
            "env": server_env(api_key, env),
        })
    }

    /// No Windows builds are distributed.
    fn supports_platform(&self, platform: Platform) -> bool {
        platform != Platform::Windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_uses_dot_config_on_macos() {
        let env = Environment::with_home(Platform::MacOs, "/Users/me");
        assert_eq!(
            Zed.config_path(&env),
            PathBuf::from("/Users/me/.config/zed/settings.json")
        );
    }

    #[test]
    fn test_entry_is_custom_source() {
        let env = Environment::with_home(Platform::Linux, "/home/me");
        let entry = Zed.server_entry("k", &env);
        assert_eq!(entry["source"], "custom");
        assert_eq!(entry["command"], "uvx");
    }

    #[test]
    fn test_not_supported_on_windows() {
        assert!(!Zed.supports_platform(Platform::Windows));
        assert!(Zed.supports_platform(Platform::MacOs));
        assert!(Zed.supports_platform(Platform::Linux));
    }
}
