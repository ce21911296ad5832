//! Configuration command implementations
//!
//! Commands for managing Supplyguard configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::{ConfigCommands, Output, OutputFormat};
use crate::config::{DEFAULT_CONFIG, SupplyguardConfig};

/// Execute config commands
pub fn execute(
    cmd: ConfigCommands,
    custom_config: Option<&str>,
    format: OutputFormat,
    output: &Output,
) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => init(force, output),
        ConfigCommands::Show => show(custom_config, format),
        ConfigCommands::Validate => validate(custom_config, output),
    }
}

fn init(force: bool, output: &Output) -> Result<()> {
    let path = Path::new("supplyguard.toml");

    if path.exists() && !force {
        output.warning("supplyguard.toml already exists (use --force to overwrite)");
        return Ok(());
    }

    // The embedded defaults double as a commented starter file
    fs::write(path, DEFAULT_CONFIG).context("Failed to write supplyguard.toml")?;
    output.success("Wrote supplyguard.toml");
    output.info("Set SUPPLYGUARD_API_TOKEN or api.token to authenticate");
    Ok(())
}

fn show(custom_config: Option<&str>, format: OutputFormat) -> Result<()> {
    let merged = SupplyguardConfig::merged_value(custom_config)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&merged)?),
        OutputFormat::Markdown => {
            println!("# Merged configuration");
            println!();
            println!("```toml");
            print!("{}", toml::to_string_pretty(&merged)?);
            println!("```");
        }
        // The native shape of the config is TOML
        OutputFormat::Text => print!("{}", toml::to_string_pretty(&merged)?),
    }
    Ok(())
}

fn validate(custom_config: Option<&str>, output: &Output) -> Result<()> {
    let config = SupplyguardConfig::load(custom_config)?;

    output.success("Configuration is valid");
    if config.api.token.is_none() && std::env::var("SUPPLYGUARD_API_TOKEN").is_err() {
        output.warning("No API token configured; authenticated commands will fail");
    }
    if let Some(org) = &config.defaults.org {
        output.info(&format!("Default organization: {}", org));
    }
    Ok(())
}
