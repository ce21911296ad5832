//! Client for the scanning service's REST API.
//!
//! The service performs the dependency scans; this module only fetches the
//! results: organizations, scan listings, raw scan artifacts, and the
//! organization security policy. Report computation happens locally in
//! [`crate::report`].

use anyhow::{Context, Result, bail};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

pub mod types;

pub use types::{Organization, OrganizationList, Page, ScanSummary};

use crate::report::{ScanArtifact, SecurityPolicy};

/// Async HTTP client bound to one API endpoint and token.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given endpoint with bearer-token auth.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("API token contains invalid header characters")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .build()
            .context("Failed to construct HTTP client")?;

        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// List the organizations visible to the token.
    pub async fn organizations(&self) -> Result<Vec<Organization>> {
        let response = self.get("/v0/organizations").await?;
        let list: OrganizationList = response
            .json()
            .await
            .context("Failed to parse organizations response")?;
        Ok(list.organizations)
    }

    /// Fetch one page of an organization's scan index.
    pub async fn scans(&self, org: &str, page: u32, per_page: u32) -> Result<Page<ScanSummary>> {
        let path = format!(
            "/v0/orgs/{}/full-scans?page={}&per_page={}",
            org, page, per_page
        );
        let response = self.get(&path).await?;
        response
            .json()
            .await
            .context("Failed to parse scan list response")
    }

    /// Fetch the raw artifacts of one scan. The endpoint streams newline
    /// delimited JSON, one artifact per line.
    pub async fn scan_artifacts(&self, org: &str, scan_id: &str) -> Result<Vec<ScanArtifact>> {
        let path = format!("/v0/orgs/{}/full-scans/{}", org, scan_id);
        let response = self.get(&path).await?;
        let body = response
            .text()
            .await
            .context("Failed to read scan artifact stream")?;
        parse_artifact_lines(&body)
    }

    /// Fetch the organization's security policy document.
    pub async fn security_policy(&self, org: &str) -> Result<SecurityPolicy> {
        let path = format!("/v0/orgs/{}/settings/security-policy", org);
        let response = self.get(&path).await?;
        response
            .json()
            .await
            .context("Failed to parse security policy response")
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "API request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "API request to {} failed with {}: {}",
                path,
                status,
                body.trim()
            );
        }

        Ok(response)
    }
}

/// Parse an NDJSON artifact stream. Blank lines are skipped; a malformed
/// line fails the whole fetch rather than silently dropping artifacts.
fn parse_artifact_lines(body: &str) -> Result<Vec<ScanArtifact>> {
    let mut artifacts = Vec::new();
    for (index, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let artifact: ScanArtifact = serde_json::from_str(line)
            .with_context(|| format!("Malformed artifact on line {}", index + 1))?;
        artifacts.push(artifact);
    }
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_stream_parses_lines_and_skips_blanks() {
        let body = concat!(
            r#"{"type":"npm","name":"tslib","version":"1.14.1","alerts":[{"type":"envVars","file":"package/which.js","start":54,"end":72}],"manifestFiles":[{"file":"package-lock.json"}]}"#,
            "\n\n",
            r#"{"type":"npm","name":"left-pad","version":"1.3.0"}"#,
            "\n",
        );

        let artifacts = parse_artifact_lines(body).unwrap();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].name, "tslib");
        assert_eq!(artifacts[0].alerts.len(), 1);
        assert_eq!(artifacts[0].alerts[0].kind, "envVars");
        assert!(artifacts[1].alerts.is_empty());
        assert!(artifacts[1].manifest_files.is_empty());
    }

    #[test]
    fn malformed_artifact_line_is_an_error() {
        let result = parse_artifact_lines("not json\n");
        assert!(result.is_err());
    }
}
