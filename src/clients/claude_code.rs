use super::{launch_command_line, CliAgent, SERVER_NAME};
use crate::config::{Environment, Platform, API_KEY_ENV, BASE_URL_ENV};
use std::path::PathBuf;

/// Claude Code, configured with `claude mcp add` at user scope.
pub struct ClaudeCode;

impl CliAgent for ClaudeCode {
    fn id(&self) -> &'static str {
        "claude-code"
    }

    fn name(&self) -> &'static str {
        "Claude Code"
    }

    fn binary_name(&self) -> &'static str {
        "claude"
    }

    fn candidate_paths(&self, env: &Environment) -> Vec<PathBuf> {
        match env.platform {
            Platform::Windows => vec![
                env.home_path(".local/bin/claude.exe"),
                env.app_config_dir().join("npm").join("claude.cmd"),
            ],
            Platform::MacOs | Platform::Linux => vec![
                env.home_path(".claude/local/claude"),
                env.home_path(".local/bin/claude"),
                PathBuf::from("/usr/local/bin/claude"),
                PathBuf::from("/opt/homebrew/bin/claude"),
            ],
        }
    }

    fn add_args(&self, api_key: &str, base_url: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "mcp".to_string(),
            "add".to_string(),
            SERVER_NAME.to_string(),
            "--env".to_string(),
            format!("{}={}", API_KEY_ENV, api_key),
        ];
        if let Some(url) = base_url.filter(|url| !url.is_empty()) {
            args.push("--env".to_string());
            args.push(format!("{}={}", BASE_URL_ENV, url));
        }
        args.extend(["--scope".to_string(), "user".to_string(), "--".to_string()]);
        args.extend(launch_command_line());
        args
    }

    fn remove_args(&self) -> Vec<String> {
        ["mcp", "remove", SERVER_NAME, "--scope", "user"]
            .map(String::from)
            .to_vec()
    }

    fn accepts_already_exists(&self) -> bool {
        true
    }
}
