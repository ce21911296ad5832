//! Scan policy report engine.
//!
//! Turns the raw artifacts of one scan plus an organization's security
//! policy into an immutable [`ScanReport`]: which alerts are in scope, what
//! action each resolves to, whether the scan passes, and the aggregation
//! folded to the requested level of detail.

pub mod engine;
pub mod types;

pub use engine::generate_report;
pub use types::{
    AlertNode, AlertOccurrence, FoldLevel, ManifestReference, PolicyAction, PolicyRule,
    ReportOptions, ReportedAlert, ScanArtifact, ScanReport, SecurityPolicy,
};
