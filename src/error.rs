use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    #[error("Failed to write config {path}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },

    #[error("Config not found")]
    ConfigNotFound,

    #[error("{0} executable not found")]
    BinaryNotFound(String),

    #[error("{program} failed: {message}")]
    ProcessInvocation { program: String, message: String },

    #[error("{program} did not finish within {seconds}s")]
    ProcessTimeout { program: String, seconds: u64 },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    InvalidApiKey(String),

    #[error("API key required. Pass --api-key or set CODEALIVE_API_KEY")]
    MissingApiKey,

    #[error("Installation cancelled")]
    CancelledByUser,

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("Could not determine home directory")]
    HomeDirNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<dialoguer::Error> for InstallerError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                InstallerError::CancelledByUser
            }
            dialoguer::Error::IO(e) => InstallerError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, InstallerError>;
