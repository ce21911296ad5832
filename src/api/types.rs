use serde::Deserialize;

/// An organization visible to the configured API token.
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

impl Organization {
    /// Human label: display name when the org has one, slug otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.slug)
    }
}

/// Envelope returned by the organizations endpoint.
#[derive(Debug, Deserialize)]
pub struct OrganizationList {
    #[serde(default)]
    pub organizations: Vec<Organization>,
}

/// One scan as listed by the scan index endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanSummary {
    pub id: String,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

/// Paginated envelope used by the listing endpoints.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default, rename = "nextPage")]
    pub next_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_page_parses_with_and_without_next_page() {
        let page: Page<ScanSummary> = serde_json::from_str(
            r#"{"results":[{"id":"scan-1","createdAt":"2026-01-02T03:04:05Z"}],"nextPage":2}"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, "scan-1");
        assert_eq!(page.next_page, Some(2));

        let last: Page<ScanSummary> = serde_json::from_str(r#"{"results":[]}"#).unwrap();
        assert!(last.results.is_empty());
        assert_eq!(last.next_page, None);
    }

    #[test]
    fn organization_label_falls_back_to_slug() {
        let org: Organization =
            serde_json::from_str(r#"{"slug":"acme","plan":"team"}"#).unwrap();
        assert_eq!(org.label(), "acme");

        let named: Organization =
            serde_json::from_str(r#"{"slug":"acme","name":"Acme Corp"}"#).unwrap();
        assert_eq!(named.label(), "Acme Corp");
    }
}
