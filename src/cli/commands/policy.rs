//! Security policy inspection

use anyhow::Result;
use std::collections::BTreeMap;

use crate::cli::commands::{CommandContext, org};
use crate::cli::{Output, OutputFormat, PolicyCommands};
use crate::report::{PolicyRule, SecurityPolicy};

/// Execute a policy subcommand
pub async fn execute(cmd: PolicyCommands, ctx: &CommandContext, output: &Output) -> Result<()> {
    match cmd {
        PolicyCommands::View => view(ctx, output).await,
    }
}

async fn view(ctx: &CommandContext, output: &Output) -> Result<()> {
    let client = ctx.client()?;
    let org = org::resolve_org(ctx, &client, output).await?;

    let spinner = output.spinner(&format!("Fetching security policy for {}...", org));
    let policy = client.security_policy(&org).await;
    spinner.finish_and_clear();
    let policy = policy?;

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&policy)?),
        OutputFormat::Markdown => print_markdown_policy(&org, &policy),
        OutputFormat::Text => print_text_policy(&org, &policy, output),
    }
    Ok(())
}

/// Rules sorted by alert type for stable display.
fn sorted_rules(policy: &SecurityPolicy) -> BTreeMap<&str, &PolicyRule> {
    policy
        .rules
        .iter()
        .map(|(kind, rule)| (kind.as_str(), rule))
        .collect()
}

fn print_text_policy(org: &str, policy: &SecurityPolicy, output: &Output) {
    output.header(&format!("Security policy for {}", org));

    let default = policy
        .default_action
        .map(|action| action.to_string())
        .unwrap_or_else(|| "(none)".to_string());
    output.key_value("Default action:", &default, false);
    output.blank_line();

    if policy.rules.is_empty() {
        output.info("No alert rules configured");
        return;
    }

    for (kind, rule) in sorted_rules(policy) {
        let action = rule
            .action
            .map(|action| action.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.table_row(kind, &action);
    }
    output.blank_line();
}

fn print_markdown_policy(org: &str, policy: &SecurityPolicy) {
    println!("# Security policy for {}", org);
    println!();
    if let Some(action) = policy.default_action {
        println!("Default action: **{}**", action);
        println!();
    }
    println!("| Alert type | Action |");
    println!("| ---------- | ------ |");
    for (kind, rule) in sorted_rules(policy) {
        let action = rule
            .action
            .map(|action| action.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("| {} | {} |", kind, action);
    }
}
