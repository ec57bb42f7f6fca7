//! MCP-capable VS Code extensions that keep their own settings file inside
//! the extension's global storage.

use super::{standard_entry, vscode, JsonAgent};
use crate::config::Environment;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy)]
pub struct VsCodeExtension {
    pub id: &'static str,
    pub name: &'static str,
    /// Marketplace identifier, which is also the global storage directory
    pub extension_id: &'static str,
    pub settings_file: &'static str,
}

pub const CLINE: VsCodeExtension = VsCodeExtension {
    id: "cline",
    name: "Cline",
    extension_id: "saoudrizwan.claude-dev",
    settings_file: "cline_mcp_settings.json",
};

pub const ROO_CODE: VsCodeExtension = VsCodeExtension {
    id: "roo-code",
    name: "Roo Code",
    extension_id: "rooveterinaryinc.roo-cline",
    settings_file: "mcp_settings.json",
};

pub const KILO_CODE: VsCodeExtension = VsCodeExtension {
    id: "kilo-code",
    name: "Kilo Code",
    extension_id: "kilocode.kilo-code",
    settings_file: "mcp_settings.json",
};

impl JsonAgent for VsCodeExtension {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn config_path(&self, env: &Environment) -> PathBuf {
        vscode::user_dir(env)
            .join("globalStorage")
            .join(self.extension_id)
            .join("settings")
            .join(self.settings_file)
    }

    /// These extensions skip servers without an explicit `disabled: false`.
    fn server_entry(&self, api_key: &str, env: &Environment) -> Value {
        let mut entry = standard_entry(api_key, env);
        if let Some(fields) = entry.as_object_mut() {
            fields.insert("disabled".to_string(), Value::Bool(false));
        }
        entry
    }
}
