use crate::error::{InstallerError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "CODEALIVE_API_KEY";
pub const BASE_URL_ENV: &str = "CODEALIVE_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://app.codealive.ai";

/// Operating system families with distinct config directory conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `~/Library/Application Support`
    MacOs,
    /// `$XDG_CONFIG_HOME`, defaulting to `~/.config`
    Linux,
    /// `%APPDATA%`
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS name to a platform. Unknown systems follow the Linux
    /// convention so the installer stays usable there.
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Linux,
        }
    }
}

/// Everything the clients need to know about the machine they run on.
///
/// Built once from the process environment and passed down explicitly, so
/// tests can point every client at a temporary home directory.
#[derive(Debug, Clone)]
pub struct Environment {
    pub platform: Platform,
    pub home: PathBuf,
    /// `APPDATA` on Windows
    pub app_data: Option<PathBuf>,
    /// `XDG_CONFIG_HOME`
    pub xdg_config_home: Option<PathBuf>,
    /// Self-hosted deployment URL, forwarded into written configs when set
    pub base_url: Option<String>,
    /// Search path for agent executables (`PATH`)
    pub search_path: Option<OsString>,
}

impl Environment {
    pub fn detect() -> Result<Self> {
        let home = dirs::home_dir().ok_or(InstallerError::HomeDirNotFound)?;
        Ok(Self {
            platform: Platform::current(),
            home,
            app_data: non_empty_var("APPDATA").map(PathBuf::from),
            xdg_config_home: non_empty_var("XDG_CONFIG_HOME").map(PathBuf::from),
            base_url: non_empty_var(BASE_URL_ENV),
            search_path: std::env::var_os("PATH"),
        })
    }

    /// An environment rooted at `home` with nothing else configured.
    pub fn with_home(platform: Platform, home: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            home: home.into(),
            app_data: None,
            xdg_config_home: None,
            base_url: None,
            search_path: None,
        }
    }

    /// Per-user application config root for the current platform.
    pub fn app_config_dir(&self) -> PathBuf {
        match self.platform {
            Platform::MacOs => self.home.join("Library").join("Application Support"),
            Platform::Windows => self
                .app_data
                .clone()
                .unwrap_or_else(|| self.home.join("AppData").join("Roaming")),
            Platform::Linux => self.xdg_config_dir(),
        }
    }

    /// `$XDG_CONFIG_HOME` or `~/.config`, on every platform.
    pub fn xdg_config_dir(&self) -> PathBuf {
        self.xdg_config_home
            .clone()
            .unwrap_or_else(|| self.home.join(".config"))
    }

    pub fn home_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.home.join(relative)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

/// Options for a single installer run, taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    /// Non-interactive: never prompt, select every detected agent
    pub ci: bool,
    pub debug: bool,
    /// Restrict the run to these agents (matched by id or display name)
    pub agents: Vec<String>,
    pub uninstall: bool,
}

impl Config {
    /// Show spinners and prompts only for a human at the terminal.
    pub fn interactive(&self) -> bool {
        !self.ci
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
