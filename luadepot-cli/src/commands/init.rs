//! Init command - create the configuration file.

use luadepot::config::{config_file_path, detect_plugin_dir, plugin_dir_candidates, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let mut config = ConfigFile::load()?;

    if config.host.plugin_dir.is_none() {
        match detect_plugin_dir() {
            Some(dir) => {
                println!("Detected plugin directory:");
                println!("  {}", dir.display());
                config.host.plugin_dir = Some(dir);
            }
            None => {
                println!("Plugin directory not detected. Looked in:");
                for candidate in plugin_dir_candidates() {
                    println!("  {}", candidate.display());
                }
                println!("Set it with: luadepot config set host.plugin_dir <path>");
            }
        }
        println!();
    }

    config.save()?;

    println!("Configuration file: {}", config_file_path().display());
    println!();
    if config.sources.repositories.is_empty() {
        println!("No repositories configured yet. Add them in priority order:");
        println!("  luadepot config set sources.repositories owner/first,owner/second");
    } else {
        println!("Repositories: {}", config.sources.repositories.join(", "));
    }
    Ok(())
}
