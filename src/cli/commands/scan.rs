//! Scan commands: policy reports, listings, and artifact summaries
//!
//! `scan report` is the heart of the CLI: it fetches one scan's artifacts and
//! the organization's security policy, runs the local report engine, renders
//! the result, and exits non-zero when the scan is unhealthy.

use anyhow::Result;
use serde_json::json;

use crate::api::ScanSummary;
use crate::cli::commands::{CommandContext, org};
use crate::cli::{Output, OutputFormat, ScanCommands};
use crate::report::{
    FoldLevel, PolicyAction, ReportOptions, ScanArtifact, ScanReport, generate_report,
};

/// Execute a scan subcommand
pub async fn execute(cmd: ScanCommands, ctx: &CommandContext, output: &Output) -> Result<()> {
    match cmd {
        ScanCommands::Report {
            scan_id,
            fold,
            report_level,
        } => report(ctx, output, &scan_id, fold, report_level).await,
        ScanCommands::List {
            per_page,
            max_pages,
        } => list(ctx, output, per_page, max_pages).await,
        ScanCommands::View { scan_id } => view(ctx, output, &scan_id).await,
    }
}

async fn report(
    ctx: &CommandContext,
    output: &Output,
    scan_id: &str,
    fold: Option<FoldLevel>,
    report_level: Option<PolicyAction>,
) -> Result<()> {
    let client = ctx.client()?;
    let org = org::resolve_org(ctx, &client, output).await?;

    let options = ReportOptions {
        fold: fold.unwrap_or(ctx.config.defaults.fold),
        report_level: report_level.unwrap_or(ctx.config.defaults.report_level),
    };

    let spinner = output.spinner(&format!("Fetching artifacts for scan {}...", scan_id));
    let artifacts = client.scan_artifacts(&org, scan_id).await;
    spinner.finish_and_clear();
    let artifacts = artifacts?;

    let spinner = output.spinner("Fetching security policy...");
    let policy = client.security_policy(&org).await;
    spinner.finish_and_clear();
    let policy = policy?;

    let report = generate_report(&org, scan_id, &artifacts, &policy, &options);

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Markdown => print_markdown_report(&report),
        OutputFormat::Text => print_text_report(&report, output),
    }

    // Unhealthy scans fail the invocation, so CI pipelines can gate on it
    if !report.healthy {
        std::process::exit(1);
    }
    Ok(())
}

async fn list(
    ctx: &CommandContext,
    output: &Output,
    per_page: Option<u32>,
    max_pages: u32,
) -> Result<()> {
    let client = ctx.client()?;
    let org = org::resolve_org(ctx, &client, output).await?;
    let per_page = per_page.unwrap_or(ctx.config.defaults.per_page);

    let mut scans: Vec<ScanSummary> = Vec::new();
    let mut page = 1u32;
    let mut fetched_pages = 0u32;
    loop {
        let spinner = output.spinner(&format!("Fetching scans for {} (page {})...", org, page));
        let result = client.scans(&org, page, per_page).await;
        spinner.finish_and_clear();
        let envelope = result?;

        scans.extend(envelope.results);
        fetched_pages += 1;
        output.verbose(&format!("Fetched page {} ({} scans so far)", page, scans.len()));

        match envelope.next_page {
            Some(next) if max_pages == 0 || fetched_pages < max_pages => page = next,
            _ => break,
        }
    }

    match ctx.format {
        OutputFormat::Json => print_json_scans(&org, &scans)?,
        OutputFormat::Markdown => print_markdown_scans(&org, &scans),
        OutputFormat::Text => print_text_scans(&org, &scans, output),
    }
    Ok(())
}

async fn view(ctx: &CommandContext, output: &Output, scan_id: &str) -> Result<()> {
    let client = ctx.client()?;
    let org = org::resolve_org(ctx, &client, output).await?;

    let spinner = output.spinner(&format!("Fetching artifacts for scan {}...", scan_id));
    let artifacts = client.scan_artifacts(&org, scan_id).await;
    spinner.finish_and_clear();
    let artifacts = artifacts?;

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&artifacts)?),
        OutputFormat::Markdown => print_markdown_artifacts(scan_id, &artifacts),
        OutputFormat::Text => print_text_artifacts(scan_id, &artifacts, output),
    }
    Ok(())
}

fn print_text_report(report: &ScanReport, output: &Output) {
    output.header("Scan Report");
    output.key_value("Organization:", &report.org_slug, false);
    output.key_value("Scan:", &report.scan_id, false);
    output.key_value("Fold:", &report.options.fold.to_string(), false);
    output.key_value("Report level:", &report.options.report_level.to_string(), false);
    output.blank_line();

    let leaves = report.leaves();
    if leaves.is_empty() {
        output.success("No alerts at or above the requested report level");
    } else {
        for (path, alert) in &leaves {
            let action = format!("[{}]", alert.policy);
            let action = match alert.policy {
                PolicyAction::Error => console::style(action).red().bold().to_string(),
                PolicyAction::Warn => console::style(action).yellow().bold().to_string(),
                _ => console::style(action).dim().to_string(),
            };
            println!(
                "{} {}",
                console::style(path.join(" / ")).cyan().bold(),
                action
            );
            println!("  type: {}", alert.kind);
            if !alert.manifest.is_empty() {
                println!("  manifest: {}", alert.manifest.join(", "));
            }
            println!("  advisory: {}", console::style(&alert.url).underlined());
        }
        output.blank_line();
        output.warning(&format!("{} alert(s) in scope", leaves.len()));
    }

    output.separator();
    output.status_indicator(
        if report.healthy { "HEALTHY" } else { "UNHEALTHY" },
        if report.healthy {
            "scan passes the security policy"
        } else {
            "at least one error-severity alert is in scope"
        },
        report.healthy,
    );
}

fn print_markdown_report(report: &ScanReport) {
    println!("# Scan report for {}", report.org_slug);
    println!();
    println!("- **Scan**: {}", report.scan_id);
    println!(
        "- **Health**: {}",
        if report.healthy { "healthy" } else { "unhealthy" }
    );
    println!("- **Fold**: {}", report.options.fold);
    println!("- **Report level**: {}", report.options.report_level);
    println!();

    let leaves = report.leaves();
    if leaves.is_empty() {
        println!("No alerts at or above the requested report level.");
        return;
    }

    println!("| Path | Action | Type | Manifest | Advisory |");
    println!("| ---- | ------ | ---- | -------- | -------- |");
    for (path, alert) in &leaves {
        println!(
            "| {} | {} | {} | {} | {} |",
            path.join(" / "),
            alert.policy,
            alert.kind,
            alert.manifest.join(", "),
            alert.url
        );
    }
}

fn print_text_scans(org: &str, scans: &[ScanSummary], output: &Output) {
    if scans.is_empty() {
        output.info(&format!("No scans found for {}", org));
        return;
    }

    output.header(&format!("Scans for {}", org));
    for scan in scans {
        let mut details = scan.created_at.as_deref().unwrap_or("-").to_string();
        if let Some(repo) = &scan.repo {
            details = format!("{}  {}", details, repo);
            if let Some(branch) = &scan.branch {
                details = format!("{}@{}", details, branch);
            }
        }
        output.table_row(&scan.id, &details);
    }
    output.blank_line();
}

fn print_json_scans(org: &str, scans: &[ScanSummary]) -> Result<()> {
    let value = json!({
        "org": org,
        "scans": scans.iter().map(|scan| json!({
            "id": scan.id,
            "createdAt": scan.created_at,
            "repo": scan.repo,
            "branch": scan.branch,
        })).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_markdown_scans(org: &str, scans: &[ScanSummary]) {
    println!("# Scans for {}", org);
    println!();
    println!("| Id | Created | Repo | Branch |");
    println!("| -- | ------- | ---- | ------ |");
    for scan in scans {
        println!(
            "| {} | {} | {} | {} |",
            scan.id,
            scan.created_at.as_deref().unwrap_or("-"),
            scan.repo.as_deref().unwrap_or("-"),
            scan.branch.as_deref().unwrap_or("-")
        );
    }
}

fn print_text_artifacts(scan_id: &str, artifacts: &[ScanArtifact], output: &Output) {
    if artifacts.is_empty() {
        output.info(&format!("Scan {} contains no artifacts", scan_id));
        return;
    }

    output.header(&format!("Artifacts in scan {}", scan_id));
    for artifact in artifacts {
        println!(
            "{} {}",
            console::style(format!(
                "{}/{}@{}",
                artifact.ecosystem, artifact.name, artifact.version
            ))
            .cyan()
            .bold(),
            console::style(format!("({} alerts)", artifact.alerts.len())).dim()
        );
        for reference in &artifact.manifest_files {
            println!("  declared in {}", reference.file);
        }
    }
    output.blank_line();
}

fn print_markdown_artifacts(scan_id: &str, artifacts: &[ScanArtifact]) {
    println!("# Artifacts in scan {}", scan_id);
    println!();
    println!("| Ecosystem | Package | Version | Alerts |");
    println!("| --------- | ------- | ------- | ------ |");
    for artifact in artifacts {
        println!(
            "| {} | {} | {} | {} |",
            artifact.ecosystem,
            artifact.name,
            artifact.version,
            artifact.alerts.len()
        );
    }
}
