//! Scan report generation.
//!
//! Resolves every alert occurrence against the organization's security
//! policy, derives the overall pass/fail health, and folds surviving alerts
//! into a nested ecosystem → package → version → file → location aggregation.
//!
//! This is a pure synchronous computation: no I/O, no shared state, and no
//! failure mode for well-formed input. Occurrences whose alert type has no
//! rule, or whose rule carries no action, are silently out of scope.

use std::collections::BTreeMap;

use super::types::{
    AlertNode, AlertOccurrence, PolicyAction, ReportOptions, ReportedAlert, ScanArtifact,
    ScanReport, SecurityPolicy,
};

/// Base URL for advisory links on report leaves.
const ADVISORY_BASE_URL: &str = "https://socket.dev";

/// Build a scan report from the artifacts and policy fetched upstream.
///
/// `healthy` is decided on the set of alerts that survive the report-level
/// filter, before folding: an `error` alert fails the report even when the
/// fold tie-break drops its leaf record.
pub fn generate_report(
    org_slug: &str,
    scan_id: &str,
    artifacts: &[ScanArtifact],
    policy: &SecurityPolicy,
    options: &ReportOptions,
) -> ScanReport {
    let mut healthy = true;
    let mut alerts: BTreeMap<String, AlertNode> = BTreeMap::new();

    for artifact in artifacts {
        let manifest = manifest_paths(artifact);
        let url = advisory_url(artifact);

        for occurrence in &artifact.alerts {
            let Some(action) = policy.action_for(&occurrence.kind) else {
                continue;
            };
            if action < options.report_level {
                continue;
            }
            if action == PolicyAction::Error {
                healthy = false;
            }

            let keys = grouping_keys(artifact, occurrence, options);
            insert_reported(
                &mut alerts,
                &keys,
                ReportedAlert {
                    policy: action,
                    kind: occurrence.kind.clone(),
                    manifest: manifest.clone(),
                    url: url.clone(),
                },
            );
        }
    }

    ScanReport {
        org_slug: org_slug.to_string(),
        scan_id: scan_id.to_string(),
        options: options.clone(),
        healthy,
        alerts,
    }
}

/// Aggregation key path for one occurrence: the ecosystem (never folded)
/// followed by as many of the four grouping keys as the fold level retains.
fn grouping_keys(
    artifact: &ScanArtifact,
    occurrence: &AlertOccurrence,
    options: &ReportOptions,
) -> Vec<String> {
    let mut keys = vec![
        artifact.ecosystem.clone(),
        artifact.name.clone(),
        artifact.version.clone(),
        occurrence.file.clone(),
        format!(
            "{} at {}:{}",
            occurrence.kind, occurrence.start, occurrence.end
        ),
    ];
    keys.truncate(1 + options.fold.retained_keys());
    keys
}

/// Insert a leaf under its key path, creating branches on the way down.
///
/// When folding collapses two reported alerts onto the same key, the first
/// record in stable input order wins and later ones are dropped.
fn insert_reported(tree: &mut BTreeMap<String, AlertNode>, keys: &[String], alert: ReportedAlert) {
    let Some((last, parents)) = keys.split_last() else {
        return;
    };

    let mut node = tree;
    for key in parents {
        match node
            .entry(key.clone())
            .or_insert_with(|| AlertNode::Branch(BTreeMap::new()))
        {
            AlertNode::Branch(children) => node = children,
            // Depth is uniform for a given fold level, so an interior key can
            // never already hold a leaf.
            AlertNode::Leaf(_) => return,
        }
    }

    node.entry(last.clone()).or_insert(AlertNode::Leaf(alert));
}

/// Manifest file paths of an artifact, deduplicated in first-seen order.
fn manifest_paths(artifact: &ScanArtifact) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for reference in &artifact.manifest_files {
        if !paths.iter().any(|path| path == &reference.file) {
            paths.push(reference.file.clone());
        }
    }
    paths
}

/// Advisory page for the affected package version.
fn advisory_url(artifact: &ScanArtifact) -> String {
    format!(
        "{}/{}/package/{}/{}",
        ADVISORY_BASE_URL, artifact.ecosystem, artifact.name, artifact.version
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{FoldLevel, ManifestReference, PolicyRule};
    use serde_json::json;

    fn occurrence(kind: &str, file: &str, start: u64, end: u64) -> AlertOccurrence {
        AlertOccurrence {
            kind: kind.to_string(),
            file: file.to_string(),
            start,
            end,
        }
    }

    fn tslib_artifact() -> ScanArtifact {
        ScanArtifact {
            ecosystem: "npm".to_string(),
            name: "tslib".to_string(),
            version: "1.14.1".to_string(),
            alerts: vec![
                occurrence("envVars", "package/which.js", 54, 72),
                occurrence("envVars", "package/which.js", 200, 250),
            ],
            manifest_files: vec![ManifestReference {
                file: "package-lock.json".to_string(),
                start: 0,
                end: 0,
            }],
        }
    }

    fn policy_with(rules: &[(&str, Option<PolicyAction>)]) -> SecurityPolicy {
        SecurityPolicy {
            rules: rules
                .iter()
                .map(|(kind, action)| (kind.to_string(), PolicyRule { action: *action }))
                .collect(),
            default_action: None,
        }
    }

    fn options(fold: FoldLevel, report_level: PolicyAction) -> ReportOptions {
        ReportOptions { fold, report_level }
    }

    fn report(
        artifacts: &[ScanArtifact],
        policy: &SecurityPolicy,
        opts: &ReportOptions,
    ) -> ScanReport {
        generate_report("test-org", "scan-1", artifacts, policy, opts)
    }

    #[test]
    fn empty_inputs_produce_healthy_empty_report() {
        let result = report(
            &[],
            &SecurityPolicy::default(),
            &options(FoldLevel::None, PolicyAction::Warn),
        );

        assert!(result.healthy);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn artifacts_without_alerts_yield_empty_report() {
        let mut artifact = tslib_artifact();
        artifact.alerts.clear();

        let result = report(
            &[artifact],
            &policy_with(&[("envVars", Some(PolicyAction::Error))]),
            &options(FoldLevel::None, PolicyAction::Warn),
        );

        assert!(result.healthy);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn error_alerts_appear_per_location_and_fail_health() {
        let result = report(
            &[tslib_artifact()],
            &policy_with(&[("envVars", Some(PolicyAction::Error))]),
            &options(FoldLevel::None, PolicyAction::Warn),
        );

        assert!(!result.healthy);
        let value = serde_json::to_value(&result).unwrap();
        let leaf = json!({
            "policy": "error",
            "type": "envVars",
            "manifest": ["package-lock.json"],
            "url": "https://socket.dev/npm/package/tslib/1.14.1",
        });
        assert_eq!(
            value["alerts"],
            json!({
                "npm": {
                    "tslib": {
                        "1.14.1": {
                            "package/which.js": {
                                "envVars at 54:72": leaf.clone(),
                                "envVars at 200:250": leaf,
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn folding_to_package_collapses_version_file_and_location() {
        let result = report(
            &[tslib_artifact()],
            &policy_with(&[("envVars", Some(PolicyAction::Error))]),
            &options(FoldLevel::Pkg, PolicyAction::Warn),
        );

        assert!(!result.healthy);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value["alerts"],
            json!({
                "npm": {
                    "tslib": {
                        "policy": "error",
                        "type": "envVars",
                        "manifest": ["package-lock.json"],
                        "url": "https://socket.dev/npm/package/tslib/1.14.1",
                    }
                }
            })
        );
    }

    #[test]
    fn below_report_level_alerts_are_excluded() {
        let result = report(
            &[tslib_artifact()],
            &policy_with(&[("envVars", Some(PolicyAction::Monitor))]),
            &options(FoldLevel::None, PolicyAction::Warn),
        );

        assert!(result.healthy);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn alerts_at_report_level_are_included() {
        let result = report(
            &[tslib_artifact()],
            &policy_with(&[("envVars", Some(PolicyAction::Ignore))]),
            &options(FoldLevel::None, PolicyAction::Ignore),
        );

        assert!(result.healthy);
        assert_eq!(result.alert_count(), 2);
    }

    #[test]
    fn unmatched_alert_types_never_surface() {
        // No rule at all for envVars.
        let no_rule = report(
            &[tslib_artifact()],
            &policy_with(&[("malware", Some(PolicyAction::Error))]),
            &options(FoldLevel::None, PolicyAction::Defer),
        );
        assert!(no_rule.healthy);
        assert!(no_rule.alerts.is_empty());

        // A rule that exists but carries no action.
        let actionless = report(
            &[tslib_artifact()],
            &policy_with(&[("envVars", None)]),
            &options(FoldLevel::None, PolicyAction::Defer),
        );
        assert!(actionless.healthy);
        assert!(actionless.alerts.is_empty());
    }

    #[test]
    fn default_action_is_not_a_fallback_for_actionless_rules() {
        let mut policy = policy_with(&[("envVars", None)]);
        policy.default_action = Some(PolicyAction::Error);

        let result = report(
            &[tslib_artifact()],
            &policy,
            &options(FoldLevel::None, PolicyAction::Defer),
        );

        assert!(result.healthy);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn raising_report_level_never_adds_alerts() {
        let mut artifact = tslib_artifact();
        artifact.alerts = vec![
            occurrence("envVars", "a.js", 1, 2),
            occurrence("networkAccess", "b.js", 3, 4),
            occurrence("malware", "c.js", 5, 6),
        ];
        let policy = policy_with(&[
            ("envVars", Some(PolicyAction::Ignore)),
            ("networkAccess", Some(PolicyAction::Warn)),
            ("malware", Some(PolicyAction::Error)),
        ]);

        let levels = [
            PolicyAction::Defer,
            PolicyAction::Ignore,
            PolicyAction::Monitor,
            PolicyAction::Warn,
            PolicyAction::Error,
        ];
        let mut previous = usize::MAX;
        for level in levels {
            let result = report(
                std::slice::from_ref(&artifact),
                &policy,
                &options(FoldLevel::None, level),
            );
            let count = result.alert_count();
            assert!(count <= previous, "count grew at level {}", level);
            previous = count;
            // The error-severity alert survives every report level, so the
            // report can never become healthy by raising it.
            assert!(!result.healthy);
        }
    }

    #[test]
    fn folding_projects_existing_packages_only() {
        let artifacts = vec![
            tslib_artifact(),
            ScanArtifact {
                ecosystem: "pypi".to_string(),
                name: "requests".to_string(),
                version: "2.31.0".to_string(),
                alerts: vec![occurrence("networkAccess", "requests/api.py", 10, 20)],
                manifest_files: vec![ManifestReference {
                    file: "requirements.txt".to_string(),
                    start: 0,
                    end: 0,
                }],
            },
        ];
        let policy = policy_with(&[
            ("envVars", Some(PolicyAction::Error)),
            ("networkAccess", Some(PolicyAction::Warn)),
        ]);

        let unfolded = report(&artifacts, &policy, &options(FoldLevel::None, PolicyAction::Warn));
        let folded = report(&artifacts, &policy, &options(FoldLevel::Pkg, PolicyAction::Warn));

        let unfolded_pkgs: std::collections::BTreeSet<(&str, &str)> = unfolded
            .leaves()
            .iter()
            .map(|(path, _)| (path[0], path[1]))
            .collect();
        let folded_pkgs: std::collections::BTreeSet<(&str, &str)> = folded
            .leaves()
            .iter()
            .map(|(path, _)| (path[0], path[1]))
            .collect();

        assert!(folded_pkgs.is_subset(&unfolded_pkgs));
        assert_eq!(folded_pkgs.len(), 2);
    }

    #[test]
    fn fold_collision_keeps_first_record() {
        let mut artifact = tslib_artifact();
        artifact.alerts = vec![
            occurrence("envVars", "package/which.js", 54, 72),
            occurrence("filesystemAccess", "package/index.js", 1, 9),
        ];
        let policy = policy_with(&[
            ("envVars", Some(PolicyAction::Warn)),
            ("filesystemAccess", Some(PolicyAction::Warn)),
        ]);

        let result = report(
            std::slice::from_ref(&artifact),
            &policy,
            &options(FoldLevel::Pkg, PolicyAction::Warn),
        );

        let leaves = result.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].0, vec!["npm", "tslib"]);
        assert_eq!(leaves[0].1.kind, "envVars");
    }

    #[test]
    fn folded_error_still_fails_health_when_its_leaf_is_dropped() {
        let mut artifact = tslib_artifact();
        artifact.alerts = vec![
            occurrence("envVars", "package/which.js", 54, 72),
            occurrence("malware", "package/index.js", 1, 9),
        ];
        let policy = policy_with(&[
            ("envVars", Some(PolicyAction::Warn)),
            ("malware", Some(PolicyAction::Error)),
        ]);

        let result = report(
            std::slice::from_ref(&artifact),
            &policy,
            &options(FoldLevel::Pkg, PolicyAction::Warn),
        );

        // The warn-level leaf won the collapsed key, but the error alert was
        // still in scope and must fail the report.
        assert_eq!(result.alert_count(), 1);
        assert_eq!(result.leaves()[0].1.policy, PolicyAction::Warn);
        assert!(!result.healthy);
    }

    #[test]
    fn fold_file_collapses_locations_within_a_file() {
        let result = report(
            &[tslib_artifact()],
            &policy_with(&[("envVars", Some(PolicyAction::Error))]),
            &options(FoldLevel::File, PolicyAction::Warn),
        );

        let leaves = result.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(
            leaves[0].0,
            vec!["npm", "tslib", "1.14.1", "package/which.js"]
        );
    }

    #[test]
    fn manifest_paths_are_deduplicated_in_first_seen_order() {
        let artifact = ScanArtifact {
            manifest_files: vec![
                ManifestReference {
                    file: "package-lock.json".to_string(),
                    start: 10,
                    end: 20,
                },
                ManifestReference {
                    file: "package.json".to_string(),
                    start: 0,
                    end: 5,
                },
                ManifestReference {
                    file: "package-lock.json".to_string(),
                    start: 30,
                    end: 40,
                },
            ],
            ..tslib_artifact()
        };

        assert_eq!(
            manifest_paths(&artifact),
            vec!["package-lock.json".to_string(), "package.json".to_string()]
        );
    }
}
