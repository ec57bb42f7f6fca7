//! Agents configured through a JSON settings file.

use super::{standard_entry, Client, SERVER_NAME};
use crate::config::{Environment, Platform};
use crate::error::{InstallerError, Result};
use crate::jsonc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Static description of a file-configured agent.
pub trait JsonAgent {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Absolute path of the config file on the current platform
    fn config_path(&self, env: &Environment) -> PathBuf;

    /// Top-level property holding the server map
    fn server_property_key(&self) -> &'static str {
        "mcpServers"
    }

    /// Entry written under `[server_property_key, "codealive"]`
    fn server_entry(&self, api_key: &str, env: &Environment) -> Value {
        standard_entry(api_key, env)
    }

    fn supports_platform(&self, _platform: Platform) -> bool {
        true
    }
}

/// [`Client`] implementation shared by every [`JsonAgent`].
pub struct JsonClient<A> {
    agent: A,
    env: Environment,
}

impl<A: JsonAgent> JsonClient<A> {
    pub fn new(agent: A, env: Environment) -> Self {
        Self { agent, env }
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn config_path(&self) -> PathBuf {
        self.agent.config_path(&self.env)
    }

    pub fn server_entry(&self, api_key: &str) -> Value {
        self.agent.server_entry(api_key, &self.env)
    }

    fn key_path(&self) -> [&'static str; 2] {
        [self.agent.server_property_key(), SERVER_NAME]
    }
}

impl<A: JsonAgent> Client for JsonClient<A> {
    fn id(&self) -> &'static str {
        self.agent.id()
    }

    fn name(&self) -> &'static str {
        self.agent.name()
    }

    /// The agent counts as installed when the config file's directory, or
    /// the directory above it, exists.
    fn is_client_supported(&self) -> bool {
        if !self.agent.supports_platform(self.env.platform) {
            return false;
        }
        let path = self.config_path();
        let parent = path.parent();
        parent.is_some_and(Path::exists) || parent.and_then(Path::parent).is_some_and(Path::exists)
    }

    fn is_server_installed(&self) -> bool {
        let path = self.config_path();
        let Ok(text) = fs::read_to_string(&path) else {
            return false;
        };
        match jsonc::parse_value(&text) {
            Ok(config) => config
                .get(self.agent.server_property_key())
                .and_then(Value::as_object)
                .is_some_and(|servers| servers.contains_key(SERVER_NAME)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "unreadable config");
                false
            }
        }
    }

    fn add_server(&self, api_key: &str) -> Result<()> {
        let path = self.config_path();
        let text = jsonc::read(&path)?;
        let entry = self.server_entry(api_key);
        let updated = jsonc::upsert(&text, &self.key_path(), &entry)?;
        jsonc::write(&path, &updated)?;
        tracing::debug!(agent = self.agent.id(), path = %path.display(), "server added");
        Ok(())
    }

    fn remove_server(&self) -> Result<()> {
        let path = self.config_path();
        if !path.exists() {
            return Err(InstallerError::ConfigNotFound);
        }
        let text = jsonc::read(&path)?;
        let updated = jsonc::remove(&text, &self.key_path())?;
        if updated != text {
            jsonc::write(&path, &updated)?;
        }
        tracing::debug!(agent = self.agent.id(), path = %path.display(), "server removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    struct TestAgent;

    impl JsonAgent for TestAgent {
        fn id(&self) -> &'static str {
            "test"
        }

        fn name(&self) -> &'static str {
            "Test Agent"
        }

        fn config_path(&self, env: &Environment) -> PathBuf {
            env.home_path(".test-agent/settings/mcp.json")
        }

        fn supports_platform(&self, platform: Platform) -> bool {
            platform != Platform::Windows
        }
    }

    fn client(temp: &TempDir) -> JsonClient<TestAgent> {
        JsonClient::new(TestAgent, Environment::with_home(Platform::Linux, temp.path()))
    }

    #[test]
    fn test_supported_when_parent_or_grandparent_exists() {
        let temp = TempDir::new().unwrap();
        let client = client(&temp);
        assert!(!client.is_client_supported());

        fs::create_dir_all(temp.path().join(".test-agent")).unwrap();
        assert!(client.is_client_supported());

        fs::create_dir_all(temp.path().join(".test-agent/settings")).unwrap();
        assert!(client.is_client_supported());
    }

    #[test]
    fn test_platform_restriction() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".test-agent/settings")).unwrap();
        let client = JsonClient::new(
            TestAgent,
            Environment::with_home(Platform::Windows, temp.path()),
        );
        assert!(!client.is_client_supported());
    }

    #[test]
    fn test_add_then_installed() {
        let temp = TempDir::new().unwrap();
        let client = client(&temp);
        assert!(!client.is_server_installed());
        assert!(!client.config_path().exists());

        client.add_server("test-key").unwrap();
        assert!(client.is_server_installed());

        let written: Value =
            serde_json::from_str(&fs::read_to_string(client.config_path()).unwrap()).unwrap();
        assert_eq!(written["mcpServers"]["codealive"]["env"]["CODEALIVE_API_KEY"], "test-key");
    }

    #[test]
    fn test_add_twice_replaces_key() {
        let temp = TempDir::new().unwrap();
        let client = client(&temp);
        client.add_server("first").unwrap();
        client.add_server("second").unwrap();

        let written: Value =
            serde_json::from_str(&fs::read_to_string(client.config_path()).unwrap()).unwrap();
        assert_eq!(
            written["mcpServers"]["codealive"]["env"]["CODEALIVE_API_KEY"],
            "second"
        );
        assert_eq!(written["mcpServers"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_unparsable_config() {
        let temp = TempDir::new().unwrap();
        let client = client(&temp);
        fs::create_dir_all(client.config_path().parent().unwrap()).unwrap();
        fs::write(client.config_path(), "{ not json").unwrap();

        assert!(!client.is_server_installed());
        let err = client.add_server("k").unwrap_err();
        assert!(matches!(err, InstallerError::ConfigParse(_)));
        // The broken file is left untouched
        assert_eq!(
            fs::read_to_string(client.config_path()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn test_property_not_an_object() {
        let temp = TempDir::new().unwrap();
        let client = client(&temp);
        fs::create_dir_all(client.config_path().parent().unwrap()).unwrap();
        fs::write(client.config_path(), r#"{"mcpServers": ["codealive"]}"#).unwrap();
        assert!(!client.is_server_installed());
    }

    #[test]
    fn test_remove_missing_config() {
        let temp = TempDir::new().unwrap();
        let client = client(&temp);
        let err = client.remove_server().unwrap_err();
        assert_eq!(err.to_string(), "Config not found");
    }

    #[test]
    fn test_remove_keeps_other_servers() {
        let temp = TempDir::new().unwrap();
        let client = client(&temp);
        fs::create_dir_all(client.config_path().parent().unwrap()).unwrap();
        fs::write(
            client.config_path(),
            r#"{"mcpServers": {"other": {"command": "node"}}}"#,
        )
        .unwrap();

        client.add_server("k").unwrap();
        client.remove_server().unwrap();

        let written: Value =
            serde_json::from_str(&fs::read_to_string(client.config_path()).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({"mcpServers": {"other": {"command": "node"}}})
        );
        assert!(!client.is_server_installed());

        // Removing again is a no-op
        client.remove_server().unwrap();
    }
}
