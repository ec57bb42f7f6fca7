//! Agents that manage MCP servers through their own command-line interface.

use super::{Client, SERVER_NAME};
use crate::config::Environment;
use crate::error::{InstallerError, Result};
use crate::utils::process::{self, DETECT_TIMEOUT, MUTATE_TIMEOUT};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// Static description of a CLI-managed agent.
pub trait CliAgent {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Executable name looked up on `PATH`
    fn binary_name(&self) -> &'static str;

    /// Well-known install locations, checked in order before `PATH`
    fn candidate_paths(&self, env: &Environment) -> Vec<PathBuf>;

    fn list_args(&self) -> Vec<String> {
        vec!["mcp".to_string(), "list".to_string()]
    }

    fn add_args(&self, api_key: &str, base_url: Option<&str>) -> Vec<String>;

    fn remove_args(&self) -> Vec<String>;

    /// Treat an add that fails with "already exists" on stderr as success.
    ///
    /// This matches on the agent's human-readable output and will break if
    /// the wording changes.
    fn accepts_already_exists(&self) -> bool {
        false
    }
}

/// [`Client`] implementation shared by every [`CliAgent`].
pub struct CliClient<A> {
    agent: A,
    env: Environment,
    binary: OnceCell<Option<PathBuf>>,
}

impl<A: CliAgent> CliClient<A> {
    pub fn new(agent: A, env: Environment) -> Self {
        Self {
            agent,
            env,
            binary: OnceCell::new(),
        }
    }

    /// Resolve the agent executable once; later calls reuse the answer.
    pub fn binary(&self) -> Option<&Path> {
        self.binary.get_or_init(|| self.locate()).as_deref()
    }

    fn locate(&self) -> Option<PathBuf> {
        if let Some(found) = self
            .agent
            .candidate_paths(&self.env)
            .into_iter()
            .find(|candidate| candidate.is_file())
        {
            tracing::debug!(agent = self.agent.id(), path = %found.display(), "found executable");
            return Some(found);
        }

        match which::which_in(
            self.agent.binary_name(),
            self.env.search_path.as_ref(),
            &self.env.home,
        ) {
            Ok(found) => {
                tracing::debug!(agent = self.agent.id(), path = %found.display(), "found executable on PATH");
                Some(found)
            }
            Err(e) => {
                tracing::debug!(agent = self.agent.id(), error = %e, "executable not found");
                None
            }
        }
    }

    fn require_binary(&self) -> Result<&Path> {
        self.binary()
            .ok_or_else(|| InstallerError::BinaryNotFound(self.agent.name().to_string()))
    }

    fn run(&self, binary: &Path, args: &[String]) -> Result<()> {
        let output = process::run(binary, args, MUTATE_TIMEOUT)?;
        if output.success {
            Ok(())
        } else {
            Err(InstallerError::ProcessInvocation {
                program: self.agent.binary_name().to_string(),
                message: output.failure_message(),
            })
        }
    }
}

impl<A: CliAgent> Client for CliClient<A> {
    fn id(&self) -> &'static str {
        self.agent.id()
    }

    fn name(&self) -> &'static str {
        self.agent.name()
    }

    fn is_client_supported(&self) -> bool {
        self.binary().is_some()
    }

    fn is_server_installed(&self) -> bool {
        let Some(binary) = self.binary() else {
            return false;
        };
        match process::run(binary, &self.agent.list_args(), DETECT_TIMEOUT) {
            Ok(output) if output.success => {
                output.stdout.contains(SERVER_NAME) || output.stderr.contains(SERVER_NAME)
            }
            Ok(output) => {
                tracing::debug!(agent = self.agent.id(), reason = %output.failure_message(), "list failed");
                false
            }
            Err(e) => {
                tracing::debug!(agent = self.agent.id(), error = %e, "list failed");
                false
            }
        }
    }

    fn add_server(&self, api_key: &str) -> Result<()> {
        let binary = self.require_binary()?;

        // A previous registration may or may not exist
        if let Err(e) = self.run(binary, &self.agent.remove_args()) {
            tracing::debug!(agent = self.agent.id(), error = %e, "nothing to remove before add");
        }

        let args = self.agent.add_args(api_key, self.env.base_url.as_deref());
        let output = process::run(binary, &args, MUTATE_TIMEOUT)?;
        if output.success {
            return Ok(());
        }
        if self.agent.accepts_already_exists() && output.stderr.contains("already exists") {
            tracing::warn!(agent = self.agent.id(), "server already registered, keeping it");
            return Ok(());
        }
        Err(InstallerError::ProcessInvocation {
            program: self.agent.binary_name().to_string(),
            message: output.failure_message(),
        })
    }

    fn remove_server(&self) -> Result<()> {
        let binary = self.require_binary()?;
        self.run(binary, &self.agent.remove_args())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Platform;
    use tempfile::TempDir;

    struct MissingAgent;

    impl CliAgent for MissingAgent {
        fn id(&self) -> &'static str {
            "missing"
        }

        fn name(&self) -> &'static str {
            "Missing"
        }

        fn binary_name(&self) -> &'static str {
            "codealive-test-agent-that-does-not-exist"
        }

        fn candidate_paths(&self, env: &Environment) -> Vec<PathBuf> {
            vec![env.home_path("bin/missing")]
        }

        fn add_args(&self, _api_key: &str, _base_url: Option<&str>) -> Vec<String> {
            vec!["add".to_string()]
        }

        fn remove_args(&self) -> Vec<String> {
            vec!["remove".to_string()]
        }
    }

    #[test]
    fn test_missing_binary() {
        let temp = TempDir::new().unwrap();
        let mut env = Environment::with_home(Platform::Linux, temp.path());
        env.search_path = Some(temp.path().as_os_str().to_owned());
        let client = CliClient::new(MissingAgent, env);

        assert!(client.binary().is_none());
        assert!(!client.is_client_supported());
        assert!(!client.is_server_installed());
        assert!(matches!(
            client.add_server("k"),
            Err(InstallerError::BinaryNotFound(_))
        ));
        assert!(matches!(
            client.remove_server(),
            Err(InstallerError::BinaryNotFound(_))
        ));
    }

    #[test]
    fn test_binary_is_memoized() {
        let temp = TempDir::new().unwrap();
        let env = Environment::with_home(Platform::Linux, temp.path());
        let client = CliClient::new(MissingAgent, env);
        assert!(client.binary().is_none());

        // Appearing later does not change the cached answer
        let path = temp.path().join("bin/missing");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "").unwrap();
        assert!(client.binary().is_none());

        let fresh = CliClient::new(MissingAgent, Environment::with_home(Platform::Linux, temp.path()));
        assert_eq!(fresh.binary(), Some(path.as_path()));
    }
}
