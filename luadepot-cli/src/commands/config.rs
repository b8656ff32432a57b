//! `config get|set|list|path` commands.

use std::path::Path;

use clap::Subcommand;
use luadepot::config::{config_file_path, ConfigFile, ConfigKey};
use luadepot::InstallTargets;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., sources.repositories)
        key: String,
    },

    /// Set a configuration value (an empty value resets it)
    Set {
        /// Configuration key in format section.key (e.g., host.plugin_dir)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'luadepot config list' to see available keys.",
            key
        ))
    })
}

fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load()?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load()?;
    config_key.set(&mut config, value)?;
    config.save()?;

    println!("Set {} = {}", config_key, config_key.get(&config));
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let plugin_dir = config.resolve_plugin_dir().ok();

    for line in render_list(&config, plugin_dir.as_deref()) {
        println!("{}", line);
    }
    Ok(())
}

/// Settings grouped by section. Repositories are shown in fallback order,
/// followed by the directories installs would write to.
fn render_list(config: &ConfigFile, plugin_dir: Option<&Path>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_section = "";
    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            if !current_section.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("[{}]", section));
            current_section = section;
        }

        let value = key.get(config);
        match key {
            ConfigKey::SourcesRepositories if !config.sources.repositories.is_empty() => {
                lines.push(format!("  {} (tried in order):", key.key_name()));
                for (index, repository) in config.sources.repositories.iter().enumerate() {
                    lines.push(format!("    {}. {}", index + 1, repository));
                }
            }
            _ if value.is_empty() => lines.push(format!("  {} = (not set)", key.key_name())),
            ConfigKey::NetworkToken => lines.push(format!("  {} = (set)", key.key_name())),
            _ => lines.push(format!("  {} = {}", key.key_name(), value)),
        }
    }

    lines.push(String::new());
    lines.push("[install targets]".to_string());
    match plugin_dir {
        Some(dir) => {
            let targets = InstallTargets::for_plugin_dir(dir);
            lines.push(format!("  scripts   -> {}", targets.plugin_dir.display()));
            lines.push(format!("  manifests -> {}", targets.depot_cache_dir.display()));
        }
        None => lines.push(
            "  plugin directory not found; run 'luadepot init' or set host.plugin_dir".to_string(),
        ),
    }
    lines
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_shows_repositories_in_fallback_order() {
        let mut config = ConfigFile::default();
        ConfigKey::SourcesRepositories
            .set(&mut config, "b/second,a/first")
            .unwrap();
        ConfigKey::NetworkToken.set(&mut config, "secret").unwrap();

        let lines = render_list(&config, Some(Path::new("/steam/config/stplug-in")));

        let start = lines
            .iter()
            .position(|l| l.contains("repositories (tried in order)"))
            .unwrap();
        assert_eq!(lines[start + 1], "    1. b/second");
        assert_eq!(lines[start + 2], "    2. a/first");
        assert!(lines.iter().any(|l| l == "  token = (set)"));
        assert!(!lines.iter().any(|l| l.contains("secret")));
        assert!(lines.iter().any(|l| l.contains("manifests") && l.contains("depotcache")));
    }

    #[test]
    fn test_list_without_plugin_dir_explains_how_to_set_it() {
        let lines = render_list(&ConfigFile::default(), None);
        assert!(lines.last().unwrap().contains("host.plugin_dir"));
    }
}
