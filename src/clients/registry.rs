use super::claude_code::ClaudeCode;
use super::claude_desktop::ClaudeDesktop;
use super::cursor::Cursor;
use super::gemini::GeminiCli;
use super::opencode::OpenCode;
use super::vscode::VsCode;
use super::vscode_extensions::{CLINE, KILO_CODE, ROO_CODE};
use super::windsurf::Windsurf;
use super::zed::Zed;
use super::{CliClient, Client, JsonClient};
use crate::config::Environment;

/// The fixed, ordered set of agents the installer knows about.
pub struct ClientRegistry {
    clients: Vec<Box<dyn Client>>,
}

impl ClientRegistry {
    pub fn new(env: &Environment) -> Self {
        let clients: Vec<Box<dyn Client>> = vec![
            Box::new(CliClient::new(ClaudeCode, env.clone())),
            Box::new(JsonClient::new(Cursor, env.clone())),
            Box::new(JsonClient::new(VsCode, env.clone())),
            Box::new(JsonClient::new(ClaudeDesktop, env.clone())),
            Box::new(JsonClient::new(Windsurf, env.clone())),
            Box::new(CliClient::new(GeminiCli, env.clone())),
            Box::new(JsonClient::new(CLINE, env.clone())),
            Box::new(JsonClient::new(ROO_CODE, env.clone())),
            Box::new(JsonClient::new(KILO_CODE, env.clone())),
            Box::new(JsonClient::new(Zed, env.clone())),
            Box::new(JsonClient::new(OpenCode, env.clone())),
        ];
        Self { clients }
    }

    /// Build a registry from an explicit client list.
    pub fn from_clients(clients: Vec<Box<dyn Client>>) -> Self {
        Self { clients }
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn Client> {
        self.clients.iter().map(|client| client.as_ref())
    }

    /// Clients that appear installed on this machine, in registry order.
    pub fn supported(&self) -> Vec<&dyn Client> {
        self.all()
            .filter(|client| {
                let supported = client.is_client_supported();
                tracing::debug!(agent = client.id(), supported, "detected");
                supported
            })
            .collect()
    }

    /// Look up a client by id or display name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&dyn Client> {
        self.all().find(|client| matches_name(*client, name))
    }
}

/// Whether `name` refers to `client` by id or display name, ignoring case.
pub fn matches_name(client: &dyn Client, name: &str) -> bool {
    let name = name.trim();
    client.id().eq_ignore_ascii_case(name) || client.name().eq_ignore_ascii_case(name)
}
