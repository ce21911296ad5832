//! Configuration management for Supplyguard.
//!
//! Layered with figment: embedded defaults, then the user config, then the
//! repository config, then `SUPPLYGUARD_*` environment variables. A custom
//! `--config PATH` replaces the user and repository layers.

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::report::{FoldLevel, PolicyAction};

// Embed the default config at compile time
pub const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Main configuration structure for Supplyguard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplyguardConfig {
    /// Service endpoint and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Default values for command flags
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the scanning service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token; the SUPPLYGUARD_API_TOKEN environment variable takes
    /// precedence over this value
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "https://api.socket.dev".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
        }
    }
}

/// Default flag values applied when a command omits them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default organization slug
    #[serde(default)]
    pub org: Option<String>,

    /// Minimum policy action severity included in reports
    #[serde(default = "default_report_level")]
    pub report_level: PolicyAction,

    /// Aggregation fold level for reports
    #[serde(default = "default_fold")]
    pub fold: FoldLevel,

    /// Page size for scan listings
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_report_level() -> PolicyAction {
    PolicyAction::Warn
}

fn default_fold() -> FoldLevel {
    FoldLevel::None
}

fn default_per_page() -> u32 {
    30
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            org: None,
            report_level: default_report_level(),
            fold: default_fold(),
            per_page: default_per_page(),
        }
    }
}

impl SupplyguardConfig {
    /// Load and type-check the merged configuration.
    pub fn load(custom_config: Option<&str>) -> Result<Self> {
        Self::figment(custom_config)
            .extract()
            .context("Invalid configuration")
    }

    /// The merged configuration as a JSON value, for `config show`.
    pub fn merged_value(custom_config: Option<&str>) -> Result<serde_json::Value> {
        Self::figment(custom_config)
            .extract()
            .context("Invalid configuration")
    }

    fn figment(custom_config: Option<&str>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        // If a custom config is specified, use only that + defaults + env vars
        if let Some(custom_path) = custom_config {
            figment = figment
                .merge(Toml::file(custom_path))
                .merge(Json::file(custom_path))
                .merge(Yaml::file(custom_path));
        } else {
            // Standard priority: user config -> repo config
            figment = figment
                .merge(Toml::file(Self::user_config_path()))
                .merge(Json::file(Self::user_config_path().replace(".toml", ".json")))
                .merge(Yaml::file(Self::user_config_path().replace(".toml", ".yaml")))
                .merge(Yaml::file(Self::user_config_path().replace(".toml", ".yml")))
                .merge(Toml::file("supplyguard.toml"))
                .merge(Json::file("supplyguard.json"))
                .merge(Yaml::file("supplyguard.yaml"))
                .merge(Yaml::file("supplyguard.yml"));
        }

        // Environment variables always have highest priority; nested keys use
        // a double underscore, e.g. SUPPLYGUARD_API__BASE_URL
        figment.merge(Env::prefixed("SUPPLYGUARD_").split("__"))
    }

    /// Path of the per-user configuration file.
    pub fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{}/.config/supplyguard/config.toml", home),
            Err(_) => "~/.config/supplyguard/config.toml".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn embedded_defaults_extract() {
        let config: SupplyguardConfig = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .extract()
            .expect("embedded defaults should type-check");

        assert_eq!(config.api.base_url, "https://api.socket.dev");
        assert_eq!(config.api.token, None);
        assert_eq!(config.defaults.report_level, PolicyAction::Warn);
        assert_eq!(config.defaults.fold, FoldLevel::None);
        assert_eq!(config.defaults.per_page, 30);
    }

    #[test]
    fn custom_config_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "[defaults]\norg = \"acme\"\nreport_level = \"error\"\nfold = \"pkg\"\n",
        )
        .unwrap();

        let config = SupplyguardConfig::load(path.to_str()).unwrap();
        assert_eq!(config.defaults.org.as_deref(), Some("acme"));
        assert_eq!(config.defaults.report_level, PolicyAction::Error);
        assert_eq!(config.defaults.fold, FoldLevel::Pkg);
        // Untouched keys keep their embedded defaults
        assert_eq!(config.api.base_url, "https://api.socket.dev");
    }

    #[test]
    fn missing_custom_config_falls_back_to_defaults() {
        let config = SupplyguardConfig::load(Some("does-not-exist.toml"));
        assert!(config.is_ok());
    }

    #[test]
    fn out_of_range_enum_values_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[defaults]\nreport_level = \"fatal\"\n").unwrap();

        let config = SupplyguardConfig::load(path.to_str());
        assert!(config.is_err());
    }
}
