//! Commands for installed apps: remove, list, has, restart.

use console::style;
use luadepot::logging::LogComponent;
use luadepot::AppId;

use crate::error::CliError;
use crate::runner::CliRunner;

fn runner(command: &str) -> Result<CliRunner, CliError> {
    let runner = CliRunner::new(LogComponent::Cli)?;
    runner.log_startup(command);
    Ok(runner)
}

/// Remove every file installed for an app.
pub fn run_remove(appid: &str) -> Result<(), CliError> {
    let app_id: AppId = appid.parse()?;
    let backend = runner("remove")?.backend()?;

    let reply = backend.remove(app_id);
    if !reply.success {
        if let Some(payload) = &reply.data {
            for file in &payload.removed_files {
                println!("  {} {}", style("removed").yellow(), file);
            }
        }
        return Err(CliError::RemoveFailed(reply.error.unwrap_or_default()));
    }
    let Some(payload) = reply.data else {
        return Err(CliError::RemoveFailed(reply.error.unwrap_or_default()));
    };

    if payload.not_found {
        println!("{}", payload.message);
        return Ok(());
    }

    println!("{} {}", style("Removed").green().bold(), payload.message);
    for file in &payload.removed_files {
        println!("  {}", file);
    }
    Ok(())
}

/// List apps with an enabled script.
pub fn run_list() -> Result<(), CliError> {
    let backend = runner("list")?.backend()?;

    let reply = backend.list_installed();
    let Some(payload) = reply.data else {
        return Err(CliError::ListFailed(reply.error.unwrap_or_default()));
    };

    if payload.apps.is_empty() {
        println!("No apps installed.");
    }
    for app in payload.apps {
        println!("{}", app);
    }
    Ok(())
}

/// Report whether an app has a script installed.
pub fn run_has(appid: &str) -> Result<(), CliError> {
    let app_id: AppId = appid.parse()?;
    let backend = runner("has")?.backend()?;

    let exists = backend
        .has_installed(app_id)
        .data
        .map(|p| p.exists)
        .unwrap_or(false);
    if exists {
        println!("{} is installed", app_id);
    } else {
        println!("{} is not installed", app_id);
    }
    Ok(())
}

/// Restart the host application.
pub fn run_restart() -> Result<(), CliError> {
    let backend = runner("restart")?.backend()?;

    let reply = backend.restart_host();
    match reply.data {
        Some(payload) => {
            println!("{}", payload.message);
            Ok(())
        }
        None => Err(CliError::RestartFailed(reply.error.unwrap_or_default())),
    }
}
