//! Command implementations for Supplyguard CLI
//!
//! This module contains the actual implementations for each CLI command.
//! Each command is organized into its own module for better maintainability.

use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::cli::OutputFormat;
use crate::config::SupplyguardConfig;

pub mod config;
pub mod org;
pub mod policy;
pub mod scan;
pub mod status;
pub mod version;

/// Shared state for commands that talk to the scanning service.
pub struct CommandContext {
    pub config: SupplyguardConfig,
    pub format: OutputFormat,
    /// Organization slug from `--org`, if given
    pub org: Option<String>,
    pub api_url: Option<String>,
    pub api_token: Option<String>,
}

impl CommandContext {
    /// Build an API client from flags and configuration. Fails when no token
    /// is available anywhere.
    pub fn client(&self) -> Result<ApiClient> {
        let base_url = self
            .api_url
            .as_deref()
            .unwrap_or(&self.config.api.base_url);
        let token = self
            .api_token
            .as_deref()
            .or(self.config.api.token.as_deref())
            .context(
                "No API token configured. Set SUPPLYGUARD_API_TOKEN or add api.token to supplyguard.toml",
            )?;
        ApiClient::new(base_url, token)
    }

    /// Whether any API token is available without constructing a client.
    pub fn has_token(&self) -> bool {
        self.api_token.is_some() || self.config.api.token.is_some()
    }
}
