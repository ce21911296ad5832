//! # Supplyguard - Supply-Chain Security Reports from Your Terminal
//!
//! A command-line client for a software-supply-chain scanning service.
//! The service scans dependency trees; Supplyguard fetches the results and
//! resolves them against your organization's security policy into a
//! pass/fail report.
//!
//! ## Quick Start
//!
//! ```bash
//! # Install supplyguard
//! cargo install supplyguard
//!
//! # Authenticate
//! export SUPPLYGUARD_API_TOKEN=...
//!
//! # Report on a scan
//! supplyguard scan report <SCAN_ID>
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod report;

pub use cli::{Cli, Output};
pub use config::SupplyguardConfig;

/// Result type alias for Supplyguard operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
