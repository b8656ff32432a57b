//! Serve command - JSON-lines RPC over stdin/stdout.
//!
//! The host runtime spawns this process once and keeps it for the session,
//! so installs started by one request keep running while later requests
//! poll their status. The process exits when stdin closes.

use std::io::{self, BufRead, Write};

use luadepot::api::rpc;
use luadepot::logging::LogComponent;
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the serve command.
pub fn run() -> Result<(), CliError> {
    let runner = CliRunner::new(LogComponent::Serve)?;
    runner.log_startup("serve");
    let backend = runner.backend()?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut handled = 0u64;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = rpc::handle_line(&backend, &line);
        writeln!(stdout, "{}", reply)?;
        stdout.flush()?;
        handled += 1;
    }

    info!(requests = handled, "stdin closed, shutting down");
    Ok(())
}
