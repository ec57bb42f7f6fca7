use super::{filter_by_name, warn, Report, Session};
use crate::clients::Client;
use crate::error::{InstallerError, Result};
use crate::verify::Verification;
use console::style;

/// Where the API key for this run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// `--api-key` or `CODEALIVE_API_KEY`
    Argument,
    CredentialStore,
    Prompt,
}

/// Run the install flow: key, verification, detection, selection, then one
/// add per selected agent.
///
/// Per-agent failures land in the returned report and do not fail the run.
pub fn execute<V>(session: &Session, verify: V) -> Result<Report>
where
    V: Fn(&str, &str) -> Result<Verification>,
{
    println!("{}", style("CodeAlive MCP installer").bold().cyan());
    println!();

    let (api_key, source) = resolve_api_key(session)?;
    verify_api_key(session, &api_key, &verify)?;

    if source != KeySource::CredentialStore {
        save_api_key(session, &api_key);
    }

    let spinner = session.spinner("Detecting AI agents...");
    let supported = session.registry.supported();
    spinner.finish_and_clear();

    if supported.is_empty() {
        println!("No supported AI agents were found on this machine.");
        let names: Vec<_> = session.registry.all().map(|c| c.name()).collect();
        println!("Install one of: {}", names.join(", "));
        return Ok(Report::default());
    }

    println!("Detected agents:");
    let installed: Vec<bool> = supported.iter().map(|c| c.is_server_installed()).collect();
    for (client, installed) in supported.iter().zip(&installed) {
        if *installed {
            println!("  • {} {}", client.name(), style("(already installed)").dim());
        } else {
            println!("  • {}", client.name());
        }
    }
    println!();

    let selected = select_agents(session, &supported, &installed)?;
    if selected.is_empty() {
        println!("No agents selected, nothing to do.");
        return Ok(Report::default());
    }

    let mut report = Report::default();
    for client in &selected {
        let spinner = session.spinner(format!("Configuring {}...", client.name()));
        let result = client.add_server(&api_key);
        spinner.finish_and_clear();
        if let Err(e) = &result {
            tracing::debug!(agent = client.id(), error = %e, "add failed");
        }
        report.record(client.name(), result);
    }

    print_summary(&report);
    Ok(report)
}

/// Pick the key from the command line, the credential store, or a prompt,
/// in that order.
pub fn resolve_api_key(session: &Session) -> Result<(String, KeySource)> {
    if let Some(key) = session
        .config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
    {
        return Ok((key.to_string(), KeySource::Argument));
    }

    if let Some(key) = session.credentials.retrieve() {
        println!("Using API key from the system credential store");
        return Ok((key, KeySource::CredentialStore));
    }

    if !session.config.interactive() {
        return Err(InstallerError::MissingApiKey);
    }

    let key = session.prompter.api_key()?;
    Ok((key, KeySource::Prompt))
}

fn verify_api_key<V>(session: &Session, api_key: &str, verify: &V) -> Result<()>
where
    V: Fn(&str, &str) -> Result<Verification>,
{
    let spinner = session.spinner("Verifying API key...");
    let result = verify(api_key, session.env.base_url());
    spinner.finish_and_clear();

    match result {
        Ok(verification) if verification.valid => {
            println!("{} {}", style("✓").green(), verification.message);
            Ok(())
        }
        Ok(verification) => Err(InstallerError::InvalidApiKey(verification.message)),
        Err(e @ (InstallerError::Network(_) | InstallerError::Timeout(_))) => {
            warn(&format!("Could not verify API key: {}", e));
            if !session.config.interactive() {
                return Ok(());
            }
            if session.prompter.confirm("Continue without verification?", false)? {
                Ok(())
            } else {
                Err(InstallerError::CancelledByUser)
            }
        }
        Err(e) => Err(e),
    }
}

fn save_api_key(session: &Session, api_key: &str) {
    if !session.credentials.is_available() {
        tracing::debug!("no credential store, key not saved");
        return;
    }
    match session.credentials.store(api_key) {
        Ok(()) => println!("API key saved to the system credential store"),
        Err(e) => {
            tracing::warn!(error = %e, "failed to save api key");
            warn(&format!("Could not save API key: {}", e));
        }
    }
}

fn select_agents<'a>(
    session: &Session,
    supported: &[&'a dyn Client],
    installed: &[bool],
) -> Result<Vec<&'a dyn Client>> {
    if !session.config.agents.is_empty() {
        return Ok(filter_by_name(session, supported, &session.config.agents));
    }
    if !session.config.interactive() {
        return Ok(supported.to_vec());
    }

    let items: Vec<String> = supported
        .iter()
        .zip(installed)
        .map(|(client, installed)| {
            if *installed {
                format!("{} (already installed)", client.name())
            } else {
                client.name().to_string()
            }
        })
        .collect();
    let indices = session
        .prompter
        .select("Select agents to configure", &items)?;
    Ok(indices
        .into_iter()
        .filter_map(|i| supported.get(i).copied())
        .collect())
}

fn print_summary(report: &Report) {
    let total = report.outcomes.len();
    let ok = report.succeeded().count();
    println!();
    if ok == total {
        println!(
            "{} CodeAlive configured for {} agent(s). Restart them to load the server.",
            style("✓").green().bold(),
            ok
        );
    } else {
        println!("Configured {} of {} agent(s).", ok, total);
        for outcome in report.failed() {
            if let Some(error) = &outcome.error {
                println!("  {}: {}", outcome.agent, error);
            }
        }
    }
}
