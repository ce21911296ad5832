//! Organization discovery
//!
//! Lists the organizations an API token can see and resolves which
//! organization a command should act on: explicit flag first, then the
//! configured default, then discovery against the service (interactive on a
//! terminal).

use anyhow::{Context, Result, bail};
use dialoguer::{Select, theme::ColorfulTheme};
use serde_json::json;

use crate::api::{ApiClient, Organization};
use crate::cli::{Output, OutputFormat};
use crate::cli::commands::CommandContext;
use crate::cli::OrgCommands;

/// Execute an org subcommand
pub async fn execute(cmd: OrgCommands, ctx: &CommandContext, output: &Output) -> Result<()> {
    match cmd {
        OrgCommands::List => list(ctx, output).await,
    }
}

async fn list(ctx: &CommandContext, output: &Output) -> Result<()> {
    let client = ctx.client()?;

    let spinner = output.spinner("Fetching organizations...");
    let orgs = client.organizations().await;
    spinner.finish_and_clear();
    let orgs = orgs?;

    match ctx.format {
        OutputFormat::Json => print_json_orgs(&orgs)?,
        OutputFormat::Markdown => print_markdown_orgs(&orgs),
        OutputFormat::Text => print_text_orgs(&orgs, output),
    }
    Ok(())
}

/// Resolve the organization a command should act on.
pub async fn resolve_org(ctx: &CommandContext, client: &ApiClient, output: &Output) -> Result<String> {
    if let Some(org) = &ctx.org {
        return Ok(org.clone());
    }
    if let Some(org) = &ctx.config.defaults.org {
        output.verbose(&format!("Using configured default organization '{}'", org));
        return Ok(org.clone());
    }

    let spinner = output.spinner("Discovering organizations...");
    let orgs = client.organizations().await;
    spinner.finish_and_clear();
    let orgs = orgs?;

    match orgs.len() {
        0 => bail!("The API token has access to no organizations"),
        1 => {
            output.verbose(&format!("Using organization '{}'", orgs[0].slug));
            Ok(orgs[0].slug.clone())
        }
        _ if atty::is(atty::Stream::Stdout) => {
            let labels: Vec<String> = orgs
                .iter()
                .map(|org| format!("{} ({})", org.label(), org.slug))
                .collect();
            let picked = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Select an organization")
                .items(&labels)
                .default(0)
                .interact()
                .context("Organization selection aborted")?;
            Ok(orgs[picked].slug.clone())
        }
        _ => {
            let slugs: Vec<&str> = orgs.iter().map(|org| org.slug.as_str()).collect();
            bail!(
                "Multiple organizations available; pass --org <SLUG>. Found: {}",
                slugs.join(", ")
            )
        }
    }
}

fn print_text_orgs(orgs: &[Organization], output: &Output) {
    if orgs.is_empty() {
        output.warning("The API token has access to no organizations");
        return;
    }

    output.header("Organizations");
    for org in orgs {
        let mut details = org.label().to_string();
        if let Some(plan) = &org.plan {
            details = format!("{} [{}]", details, plan);
        }
        output.table_row(&org.slug, &details);
    }
    output.blank_line();
}

fn print_json_orgs(orgs: &[Organization]) -> Result<()> {
    let value = json!({
        "organizations": orgs.iter().map(|org| json!({
            "slug": org.slug,
            "name": org.name,
            "plan": org.plan,
        })).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_markdown_orgs(orgs: &[Organization]) {
    println!("# Organizations");
    println!();
    println!("| Slug | Name | Plan |");
    println!("| ---- | ---- | ---- |");
    for org in orgs {
        println!(
            "| {} | {} | {} |",
            org.slug,
            org.name.as_deref().unwrap_or("-"),
            org.plan.as_deref().unwrap_or("-")
        );
    }
}
