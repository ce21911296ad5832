use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Severity actions an organization can attach to an alert type.
///
/// The derived ordering is load-bearing: report-level filtering compares
/// actions with `<`, so the variants must stay sorted from least to most
/// severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Defer,
    Ignore,
    Monitor,
    Warn,
    Error,
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyAction::Defer => write!(f, "defer"),
            PolicyAction::Ignore => write!(f, "ignore"),
            PolicyAction::Monitor => write!(f, "monitor"),
            PolicyAction::Warn => write!(f, "warn"),
            PolicyAction::Error => write!(f, "error"),
        }
    }
}

/// How far the report aggregation is collapsed before emitting leaf records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldLevel {
    /// Keep every location; one leaf per occurrence.
    None,
    /// Collapse locations; one leaf per file.
    File,
    /// Collapse files; one leaf per version.
    Version,
    /// Collapse versions; one leaf per package.
    Pkg,
}

impl FoldLevel {
    /// Number of grouping keys (package, version, file, location) kept below
    /// the ecosystem level.
    pub(crate) fn retained_keys(self) -> usize {
        match self {
            FoldLevel::None => 4,
            FoldLevel::File => 3,
            FoldLevel::Version => 2,
            FoldLevel::Pkg => 1,
        }
    }
}

impl std::fmt::Display for FoldLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FoldLevel::None => write!(f, "none"),
            FoldLevel::File => write!(f, "file"),
            FoldLevel::Version => write!(f, "version"),
            FoldLevel::Pkg => write!(f, "pkg"),
        }
    }
}

/// One scanned package as returned by the scanning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanArtifact {
    /// Ecosystem tag, e.g. "npm" or "pypi".
    #[serde(rename = "type")]
    pub ecosystem: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub alerts: Vec<AlertOccurrence>,
    #[serde(default, rename = "manifestFiles")]
    pub manifest_files: Vec<ManifestReference>,
}

/// One concrete finding at a byte range in one file of an artifact.
///
/// Alert types are an open vocabulary shared with the policy service; new
/// types appear without a CLI release, so this stays a plain string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertOccurrence {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub end: u64,
}

/// Where the owning artifact was declared, e.g. a lockfile entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestReference {
    pub file: String,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub end: u64,
}

/// An organization's security policy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityPolicy {
    #[serde(default, rename = "securityPolicyRules")]
    pub rules: HashMap<String, PolicyRule>,

    /// Org-wide default. Part of the policy document and shown by
    /// `policy view`, but not consulted when resolving individual alerts.
    #[serde(default, rename = "securityPolicyDefault")]
    pub default_action: Option<PolicyAction>,
}

impl SecurityPolicy {
    /// Resolve the configured action for an alert type, if any.
    pub fn action_for(&self, kind: &str) -> Option<PolicyAction> {
        self.rules.get(kind).and_then(|rule| rule.action)
    }
}

/// A single policy rule. A rule without an action is treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyRule {
    #[serde(default)]
    pub action: Option<PolicyAction>,
}

/// Caller-selected report shape.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOptions {
    pub fold: FoldLevel,
    #[serde(rename = "reportLevel")]
    pub report_level: PolicyAction,
}

/// Leaf record of the aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedAlert {
    /// Action the policy resolved this alert to.
    pub policy: PolicyAction,
    #[serde(rename = "type")]
    pub kind: String,
    /// Deduplicated manifest file paths of the owning artifact.
    pub manifest: Vec<String>,
    /// Advisory page for the affected package version.
    pub url: String,
}

/// Node of the nested aggregation: either another keyed level or a leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlertNode {
    Branch(BTreeMap<String, AlertNode>),
    Leaf(ReportedAlert),
}

/// Immutable result of one report engine invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub org_slug: String,
    pub scan_id: String,
    pub options: ReportOptions,
    pub healthy: bool,
    pub alerts: BTreeMap<String, AlertNode>,
}

impl ScanReport {
    /// Flatten the aggregation into (key path, leaf) pairs in key order.
    pub fn leaves(&self) -> Vec<(Vec<&str>, &ReportedAlert)> {
        let mut out = Vec::new();
        for (key, node) in &self.alerts {
            collect_leaves(node, vec![key.as_str()], &mut out);
        }
        out
    }

    /// Total number of leaf records across all levels.
    pub fn alert_count(&self) -> usize {
        self.leaves().len()
    }
}

fn collect_leaves<'a>(
    node: &'a AlertNode,
    path: Vec<&'a str>,
    out: &mut Vec<(Vec<&'a str>, &'a ReportedAlert)>,
) {
    match node {
        AlertNode::Branch(children) => {
            for (key, child) in children {
                let mut next = path.clone();
                next.push(key.as_str());
                collect_leaves(child, next, out);
            }
        }
        AlertNode::Leaf(alert) => out.push((path, alert)),
    }
}
