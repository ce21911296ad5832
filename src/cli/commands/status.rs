//! Show local setup status
//!
//! This command displays which configuration files are in effect, whether an
//! API token is available, and whether the token can reach the service.

use anyhow::Result;
use std::path::Path;

use crate::cli::Output;
use crate::cli::commands::CommandContext;
use crate::config::SupplyguardConfig;

/// Execute the status command
pub async fn execute(ctx: &CommandContext, output: &Output) -> Result<()> {
    output.header("Supplyguard Status");

    output.category("Configuration");
    let user_config = SupplyguardConfig::user_config_path();
    for path in [user_config.as_str(), "supplyguard.toml"] {
        if Path::new(path).exists() {
            output.list_item(&format!("{} (found)", path));
        } else {
            output.list_item(&format!("{} (not present)", path));
        }
    }
    output.key_value("API endpoint:", &ctx.config.api.base_url, false);
    if let Some(org) = &ctx.config.defaults.org {
        output.key_value("Default org:", org, false);
    }
    output.blank_line();

    output.category("Authentication");
    if !ctx.has_token() {
        output.status_indicator("TOKEN", "no API token configured", false);
        output.info("Set SUPPLYGUARD_API_TOKEN or add api.token to supplyguard.toml");
        return Ok(());
    }

    let client = ctx.client()?;
    let spinner = output.spinner("Verifying API token...");
    let orgs = client.organizations().await;
    spinner.finish_and_clear();

    match orgs {
        Ok(orgs) => {
            output.status_indicator(
                "TOKEN",
                &format!("valid, {} organization(s) visible", orgs.len()),
                true,
            );
        }
        Err(err) => {
            output.status_indicator("TOKEN", "configured but rejected by the service", false);
            output.error(&format!("{:#}", err));
        }
    }

    Ok(())
}
