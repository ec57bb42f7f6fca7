//! API key persistence in the operating system's credential store.
//!
//! - macOS: the login keychain via `security`
//! - Linux: the Secret Service via `secret-tool` (libsecret)
//! - Windows: the Credential Manager via `cmdkey`
//!
//! Every operation shells out with [`DETECT_TIMEOUT`]. Callers treat failures
//! as warnings; the installer works without a credential store.

use crate::config::{Environment, Platform};
use crate::error::{InstallerError, Result};
use crate::utils::process::{self, CommandOutput, DETECT_TIMEOUT};
use std::path::{Path, PathBuf};

pub const SERVICE_NAME: &str = "codealive-api-key";
pub const ACCOUNT_NAME: &str = "codealive";
const LABEL: &str = "CodeAlive API key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Keychain,
    SecretService,
    CredentialManager,
}

impl Backend {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::MacOs => Backend::Keychain,
            Platform::Linux => Backend::SecretService,
            Platform::Windows => Backend::CredentialManager,
        }
    }

    fn tool(self) -> &'static str {
        match self {
            Backend::Keychain => "security",
            Backend::SecretService => "secret-tool",
            Backend::CredentialManager => "cmdkey",
        }
    }
}

pub struct CredentialStore {
    backend: Backend,
    tool: Option<PathBuf>,
}

impl CredentialStore {
    /// Pick the backend for the current platform and locate its tool on `PATH`.
    pub fn detect(env: &Environment) -> Self {
        let backend = Backend::for_platform(env.platform);
        let tool = which::which_in(backend.tool(), env.search_path.as_ref(), &env.home).ok();
        if tool.is_none() {
            tracing::debug!(tool = backend.tool(), "credential store tool not found");
        }
        Self { backend, tool }
    }

    /// Use an explicit tool path, bypassing lookup.
    pub fn with_tool(backend: Backend, tool: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            tool: Some(tool.into()),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn is_available(&self) -> bool {
        self.tool.is_some()
    }

    pub fn store(&self, api_key: &str) -> Result<()> {
        let tool = self.require_tool()?;
        let label = format!("--label={}", LABEL);
        let output = match self.backend {
            Backend::Keychain => process::run(
                tool,
                &[
                    "add-generic-password",
                    "-U",
                    "-a",
                    ACCOUNT_NAME,
                    "-s",
                    SERVICE_NAME,
                    "-w",
                    api_key,
                ],
                DETECT_TIMEOUT,
            )?,
            Backend::SecretService => process::run_with_input(
                tool,
                &[
                    "store",
                    label.as_str(),
                    "service",
                    SERVICE_NAME,
                    "account",
                    ACCOUNT_NAME,
                ],
                Some(api_key),
                DETECT_TIMEOUT,
            )?,
            Backend::CredentialManager => process::run(
                tool,
                &[
                    format!("/generic:{}", SERVICE_NAME),
                    format!("/user:{}", ACCOUNT_NAME),
                    format!("/pass:{}", api_key),
                ],
                DETECT_TIMEOUT,
            )?,
        };
        self.check(output)?;
        tracing::debug!(backend = ?self.backend, "api key stored");
        Ok(())
    }

    /// The stored key, if any. Lookup failures count as "nothing stored".
    pub fn retrieve(&self) -> Option<String> {
        let tool = self.tool.as_deref()?;
        let result = match self.backend {
            Backend::Keychain => process::run(
                tool,
                &[
                    "find-generic-password",
                    "-a",
                    ACCOUNT_NAME,
                    "-s",
                    SERVICE_NAME,
                    "-w",
                ],
                DETECT_TIMEOUT,
            ),
            Backend::SecretService => process::run(
                tool,
                &["lookup", "service", SERVICE_NAME, "account", ACCOUNT_NAME],
                DETECT_TIMEOUT,
            ),
            // cmdkey can list credentials but never prints secrets
            Backend::CredentialManager => return None,
        };

        match result {
            Ok(output) if output.success => {
                let key = output.stdout.trim();
                (!key.is_empty()).then(|| key.to_string())
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "credential lookup failed");
                None
            }
        }
    }

    pub fn delete(&self) -> Result<()> {
        let tool = self.require_tool()?;
        let output = match self.backend {
            Backend::Keychain => process::run(
                tool,
                &[
                    "delete-generic-password",
                    "-a",
                    ACCOUNT_NAME,
                    "-s",
                    SERVICE_NAME,
                ],
                DETECT_TIMEOUT,
            )?,
            Backend::SecretService => process::run(
                tool,
                &["clear", "service", SERVICE_NAME, "account", ACCOUNT_NAME],
                DETECT_TIMEOUT,
            )?,
            Backend::CredentialManager => process::run(
                tool,
                &[format!("/delete:{}", SERVICE_NAME)],
                DETECT_TIMEOUT,
            )?,
        };
        self.check(output)?;
        tracing::debug!(backend = ?self.backend, "api key deleted");
        Ok(())
    }

    fn require_tool(&self) -> Result<&Path> {
        self.tool.as_deref().ok_or_else(|| {
            InstallerError::CredentialStore(format!("{} is not available", self.backend.tool()))
        })
    }

    fn check(&self, output: CommandOutput) -> Result<()> {
        if output.success {
            Ok(())
        } else {
            Err(InstallerError::CredentialStore(format!(
                "{}: {}",
                self.backend.tool(),
                output.failure_message()
            )))
        }
    }
}
