use super::{launch_command_line, CliAgent, SERVER_NAME};
use crate::config::{Environment, Platform, API_KEY_ENV, BASE_URL_ENV};
use std::path::PathBuf;

/// Gemini CLI, configured with `gemini mcp add` at user scope.
pub struct GeminiCli;

impl CliAgent for GeminiCli {
    fn id(&self) -> &'static str {
        "gemini"
    }

    fn name(&self) -> &'static str {
        "Gemini CLI"
    }

    fn binary_name(&self) -> &'static str {
        "gemini"
    }

    fn candidate_paths(&self, env: &Environment) -> Vec<PathBuf> {
        match env.platform {
            Platform::Windows => vec![env.app_config_dir().join("npm").join("gemini.cmd")],
            Platform::MacOs | Platform::Linux => vec![
                env.home_path(".local/bin/gemini"),
                PathBuf::from("/usr/local/bin/gemini"),
                PathBuf::from("/opt/homebrew/bin/gemini"),
            ],
        }
    }

    fn add_args(&self, api_key: &str, base_url: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "mcp".to_string(),
            "add".to_string(),
            "--scope".to_string(),
            "user".to_string(),
            "-e".to_string(),
            format!("{}={}", API_KEY_ENV, api_key),
        ];
        if let Some(url) = base_url.filter(|url| !url.is_empty()) {
            args.push("-e".to_string());
            args.push(format!("{}={}", BASE_URL_ENV, url));
        }
        args.push(SERVER_NAME.to_string());
        args.push("--".to_string());
        args.extend(launch_command_line());
        args
    }

    fn remove_args(&self) -> Vec<String> {
        ["mcp", "remove", "--scope", "user", SERVER_NAME]
            .map(String::from)
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_args() {
        assert_eq!(
            GeminiCli.add_args("k", Some("https://ca.internal")),
            vec![
                "mcp",
                "add",
                "--scope",
                "user",
                "-e",
                "CODEALIVE_API_KEY=k",
                "-e",
                "CODEALIVE_BASE_URL=https://ca.internal",
                "codealive",
                "--",
                "uvx",
                "codealive-mcp"
            ]
        );
    }

    #[test]
    fn test_remove_args() {
        assert_eq!(
            GeminiCli.remove_args(),
            vec!["mcp", "remove", "--scope", "user", "codealive"]
        );
    }

    #[test]
    fn test_windows_candidate_uses_npm_shim() {
        let mut env = Environment::with_home(Platform::Windows, "/home/me");
        env.app_data = Some(PathBuf::from("/roaming"));
        assert_eq!(
            GeminiCli.candidate_paths(&env),
            vec![PathBuf::from("/roaming/npm/gemini.cmd")]
        );
    }
}
