use super::{filter_by_name, warn, Report, Session};
use crate::clients::Client;
use crate::error::Result;
use console::style;

/// Remove the `codealive` registration from every detected agent that has it.
pub fn execute(session: &Session) -> Result<Report> {
    println!("{}", style("CodeAlive MCP uninstaller").bold().cyan());
    println!();

    let spinner = session.spinner("Looking for CodeAlive registrations...");
    let registered: Vec<&dyn Client> = session
        .registry
        .supported()
        .into_iter()
        .filter(|client| client.is_server_installed())
        .collect();
    spinner.finish_and_clear();

    let targets = if session.config.agents.is_empty() {
        registered
    } else {
        filter_by_name(session, &registered, &session.config.agents)
    };

    let mut report = Report::default();
    if targets.is_empty() {
        println!("CodeAlive is not registered with any detected agent.");
    } else {
        println!("Removing CodeAlive from:");
        for client in &targets {
            let result = client.remove_server();
            if let Err(e) = &result {
                tracing::debug!(agent = client.id(), error = %e, "remove failed");
            }
            report.record(client.name(), result);
        }
        println!();
        println!(
            "Removed from {} of {} agent(s).",
            report.succeeded().count(),
            report.outcomes.len()
        );
    }

    forget_api_key(session)?;
    Ok(report)
}

fn forget_api_key(session: &Session) -> Result<()> {
    if !session.config.interactive() || session.credentials.retrieve().is_none() {
        return Ok(());
    }
    if !session
        .prompter
        .confirm("Also delete the API key from the system credential store?", false)?
    {
        return Ok(());
    }
    match session.credentials.delete() {
        Ok(()) => println!("API key deleted"),
        Err(e) => warn(&format!("Could not delete API key: {}", e)),
    }
    Ok(())
}
