//! Configuration view and validation commands — `qcdesk config`.

use anyhow::Result;

use qcdesk::config::{ENV_API_URL, ENV_TIMEOUT, QcToml};

use super::super::{Cli, ConfigCommands};
use super::AppContext;

pub fn cmd_config(cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    let ctx = AppContext::load(cli)?;
    let config = &ctx.config;
    let config_path = &config.path;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("qcdesk Configuration");
            println!("====================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No qcdesk.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let toml = &config.toml;
            println!("[api]");
            println!("  base_url = \"{}\"", toml.api.base_url);
            println!("  timeout_secs = {}", toml.api.timeout_secs);
            println!();
            println!("[defaults]");
            if let Some(plant) = &toml.defaults.plant {
                println!("  plant = \"{}\"", plant);
            }
            if let Some(line) = &toml.defaults.line {
                println!("  line = \"{}\"", line);
            }
            println!("  shift = \"{}\"", toml.defaults.shift);
            println!("  auto_deduct = {}", toml.defaults.auto_deduct);
            println!("  history_take = {}", toml.defaults.history_take);
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  base_url = \"{}\"", config.base_url());
            println!("  timeout_secs = {}", config.timeout().as_secs());
            println!("  session_dir = {}", ctx.store.dir().display());
            println!();
            if !config_path.exists() {
                println!("Run 'qcdesk config init' to create a qcdesk.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let warnings = config.validate();
            if warnings.is_empty() {
                if config_path.exists() {
                    println!("Configuration is valid.");
                } else {
                    println!("No qcdesk.toml found. Using defaults (valid).");
                }
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("qcdesk.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            QcToml::default().save(config_path)?;

            println!("Created qcdesk.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs");
            println!("  - [defaults] plant, line, shift, auto_deduct, history_take");
            println!();
            println!(
                "{} and {} override the [api] values at run time.",
                ENV_API_URL, ENV_TIMEOUT
            );
            println!();
        }
    }

    Ok(())
}
