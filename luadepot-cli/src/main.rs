//! luadepot CLI - command-line interface
//!
//! Thin front end over the `luadepot` library: each subcommand loads the
//! configuration, builds the backend and calls one boundary operation.

mod commands;
mod error;
mod runner;

use std::process;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use error::CliError;

#[derive(Parser)]
#[command(name = "luadepot")]
#[command(version = luadepot::VERSION)]
#[command(about = "Install per-app script and manifest bundles from source repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install an app's files and wait for the result
    Install {
        /// Application id
        appid: String,
    },

    /// Remove every file installed for an app
    Remove {
        /// Application id
        appid: String,
    },

    /// List apps with an installed script
    List,

    /// Check whether an app has a script installed
    Has {
        /// Application id
        appid: String,
    },

    /// Restart the host application using host.restart_command
    Restart,

    /// Serve JSON-lines requests on stdin/stdout
    Serve,

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Create the configuration file, detecting the plugin directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Install { appid } => commands::install::run(&appid),
        Commands::Remove { appid } => commands::manage::run_remove(&appid),
        Commands::List => commands::manage::run_list(),
        Commands::Has { appid } => commands::manage::run_has(&appid),
        Commands::Restart => commands::manage::run_restart(),
        Commands::Serve => commands::serve::run(),
        Commands::Config { command } => commands::config::run(command),
        Commands::Init => commands::init::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install() {
        let cli = Cli::try_parse_from(["luadepot", "install", "730"]).unwrap();
        assert!(matches!(cli.command, Commands::Install { appid } if appid == "730"));
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from([
            "luadepot",
            "config",
            "set",
            "sources.repositories",
            "a/b,c/d",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { .. }
            }
        ));
    }
}
