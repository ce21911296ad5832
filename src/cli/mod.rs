//! Command-line interface for Supplyguard
//!
//! This module provides the main CLI structure and command handling for
//! Supplyguard. It uses clap for argument parsing and provides a clean,
//! user-friendly interface.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

pub mod commands;
mod output;

pub use output::Output;

use crate::config::SupplyguardConfig;
use crate::report::{FoldLevel, PolicyAction};
use commands::CommandContext;

/// Supplyguard - Supply-chain security reports from your terminal
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable quiet output (minimal)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Organization slug (overrides the configured default)
    #[arg(short, long, global = true)]
    pub org: Option<String>,

    /// API endpoint override
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// API token for the scanning service
    #[arg(long, env = "SUPPLYGUARD_API_TOKEN", hide_env_values = true, global = true)]
    pub api_token: Option<String>,

    /// Output format (text, json, markdown)
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for data-shaped commands
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON format
    Json,
    /// Markdown summary
    Markdown,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan listing, inspection, and policy reports
    #[command(subcommand)]
    Scan(ScanCommands),
    /// Organization discovery
    #[command(subcommand)]
    Org(OrgCommands),
    /// Security policy inspection
    #[command(subcommand)]
    Policy(PolicyCommands),
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Show local setup and authentication status
    Status,
    /// Show version information
    Version,
}

/// Scan subcommands
#[derive(Subcommand)]
pub enum ScanCommands {
    /// Resolve a scan against the org security policy and report health
    Report {
        /// Scan identifier
        #[arg(value_name = "SCAN_ID")]
        scan_id: String,

        /// Collapse the aggregation to this level
        #[arg(long, value_enum)]
        fold: Option<FoldLevel>,

        /// Minimum policy action severity to include
        #[arg(long, value_enum)]
        report_level: Option<PolicyAction>,
    },
    /// List scans for an organization
    List {
        /// Results per page
        #[arg(long)]
        per_page: Option<u32>,

        /// Pages to fetch (0 = all pages)
        #[arg(long, default_value = "1")]
        max_pages: u32,
    },
    /// Summarize the artifacts of one scan
    View {
        /// Scan identifier
        #[arg(value_name = "SCAN_ID")]
        scan_id: String,
    },
}

/// Organization subcommands
#[derive(Subcommand)]
pub enum OrgCommands {
    /// List organizations visible to the token
    List,
}

/// Policy subcommands
#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Show the organization's security policy
    View,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a starter supplyguard.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the merged configuration
    Show,
    /// Validate configuration
    Validate,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        // Initialize output handler with global verbose and quiet settings
        let output = Output::new(self.verbose, self.quiet);

        let Some(command) = self.command else {
            // Show help when no command is provided
            let mut cmd = Cli::command();
            cmd.print_help()?;
            return Ok(());
        };

        match command {
            // Config subcommands operate on the configuration itself and must
            // not fail because the current configuration is broken
            Commands::Config(cmd) => {
                commands::config::execute(cmd, self.config.as_deref(), self.format, &output)
            }
            command => {
                let config = SupplyguardConfig::load(self.config.as_deref())?;
                let ctx = CommandContext {
                    config,
                    format: self.format,
                    org: self.org,
                    api_url: self.api_url,
                    api_token: self.api_token,
                };

                match command {
                    Commands::Scan(cmd) => commands::scan::execute(cmd, &ctx, &output).await,
                    Commands::Org(cmd) => commands::org::execute(cmd, &ctx, &output).await,
                    Commands::Policy(cmd) => commands::policy::execute(cmd, &ctx, &output).await,
                    Commands::Status => commands::status::execute(&ctx, &output).await,
                    Commands::Version => commands::version::execute(&output),
                    Commands::Config(_) => unreachable!("handled above"),
                }
            }
        }
    }
}
