//! Install command - request an install and follow its progress.

use std::thread;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use luadepot::logging::LogComponent;
use luadepot::progress::{InstallStatus, ProgressRecord};
use luadepot::AppId;

use crate::error::CliError;
use crate::runner::CliRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the install command.
pub fn run(appid: &str) -> Result<(), CliError> {
    let app_id: AppId = appid.parse()?;

    let runner = CliRunner::new(LogComponent::Cli)?;
    runner.log_startup("install");
    let backend = runner.backend()?;

    if runner.config().sources.repositories.is_empty() {
        println!(
            "{} no repositories configured (luadepot config set sources.repositories ...)",
            style("warning:").yellow().bold()
        );
    }

    backend.install(app_id);

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar.enable_steady_tick(POLL_INTERVAL);

    let record = loop {
        let record = backend.coordinator().query_status(app_id);
        render(&bar, &record);
        if record.is_terminal() {
            break record;
        }
        thread::sleep(POLL_INTERVAL);
    };

    match record.status {
        Some(InstallStatus::Done) => {
            bar.finish_and_clear();
            println!(
                "{} app {} from {} ({} files, {} bytes)",
                style("Installed").green().bold(),
                app_id,
                record.current_repository.as_deref().unwrap_or("?"),
                record.downloaded_files,
                record.bytes_read
            );
            Ok(())
        }
        _ => {
            bar.abandon();
            Err(CliError::InstallFailed(
                record
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

fn render(bar: &ProgressBar, record: &ProgressRecord) {
    bar.set_length(record.total_files as u64);
    bar.set_position(record.downloaded_files as u64);

    let status = record.status.map(InstallStatus::name).unwrap_or("pending");
    match &record.current_repository {
        Some(repository) => bar.set_message(format!("{} {}", status, repository)),
        None => bar.set_message(status.to_string()),
    }
}
