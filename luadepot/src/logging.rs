//! Logging setup.

use std::path::Path;

pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Where the process is running, which decides where logs may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogComponent {
    /// Interactive command: file log plus warnings on stderr.
    Cli,
    /// JSON-lines server on stdio: file log only.
    Serve,
}

impl LogComponent {
    /// Log file prefix.
    pub fn name(self) -> &'static str {
        match self {
            LogComponent::Cli => "cli",
            LogComponent::Serve => "serve",
        }
    }
}

/// Install the global subscriber.
///
/// Logs roll daily in `log_dir` as `<component>.log.<date>`. `RUST_LOG`
/// overrides `level`. The returned guard flushes the file writer on drop
/// and must be held for the life of the process.
pub fn init_logging(component: LogComponent, log_dir: &Path, level: &str) -> WorkerGuard {
    if let Err(e) = ensure_log_dir(log_dir) {
        eprintln!(
            "cannot create log directory {}, file logging disabled: {}",
            log_dir.display(),
            e
        );
    }

    let file_appender =
        tracing_appender::rolling::daily(log_dir, format!("{}.log", component.name()));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true);

    // stdout carries the protocol in serve mode, stderr stays quiet there too
    let result = match component {
        LogComponent::Cli => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .with_filter(LevelFilter::WARN);
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(stderr_layer)
                .try_init()
        }
        LogComponent::Serve => tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {}", e);
    }

    guard
}

fn ensure_log_dir(log_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(log_dir)
}
