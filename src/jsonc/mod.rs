//! Format-preserving edits of agent config files.
//!
//! Agent configs are JSON with comments and trailing commas tolerated (Zed and
//! VS Code settings in particular). Reading goes through a span-tracking parser
//! so that setting or removing a single `[property, key]` path leaves the rest
//! of the file byte-for-byte intact.

pub mod edit;
pub mod parser;

pub use edit::{remove, upsert};

use crate::error::{InstallerError, Result};
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Read a config file. A missing file reads as an empty document.
pub fn read(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Parse tolerant JSON into a plain value.
pub fn parse_value(text: &str) -> Result<Value> {
    let root = parser::parse(text)?;
    root.to_value(text)
}

/// Write a config file, creating parent directories as needed.
///
/// Content goes to a temporary file in the target directory which is then
/// renamed over the target, so readers see either the old or the new file.
pub fn write(path: &Path, text: &str) -> Result<()> {
    let write_error = |e: std::io::Error| InstallerError::ConfigWrite {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_error)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_error)?;
    temp.write_all(text.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;

    // Keep the permissions of the file being replaced
    if let Ok(metadata) = fs::metadata(path) {
        let _ = fs::set_permissions(temp.path(), metadata.permissions());
    }

    temp.persist(path).map_err(|e| write_error(e.error))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.json");
        assert_eq!(read(&path).unwrap(), "");
        assert!(!path.exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("config.json");
        write(&path, "{}\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn test_write_replaces_existing_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{\"old\": true}").unwrap();
        write(&path, "{\"new\": true}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"new\": true}");

        // No temporary files left behind
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write(&path, "{\"a\": 1}").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_parse_value_tolerates_comments() {
        let value = parse_value("{\n  // c\n  \"a\": [1,],\n}").unwrap();
        assert_eq!(value, json!({"a": [1]}));
    }
}
