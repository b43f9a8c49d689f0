//! Reference summaries from the Wikipedia REST API.
//!
//! Lookup order for a name like "Harbour Systems":
//!   Harbour_Systems → (disambiguation) Harbour_Systems_(company)
//!   → (still no extract) Harbour_Systems_(organisation) → Harbour_Systems_(organization)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;

const USER_AGENT: &str = "JobConnect/0.1 (company summary lookup)";

/// Short encyclopedic summary of a named subject.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// `Ok(None)` when no page with an extract exists for `name`.
    async fn summary(&self, name: &str) -> Result<Option<String>, AppError>;
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PageSummary {
    #[serde(rename = "type", default)]
    pub page_type: String,
    #[serde(default)]
    pub extract: Option<String>,
}

impl PageSummary {
    fn is_disambiguation(&self) -> bool {
        self.page_type == "disambiguation"
    }

    fn extract(&self) -> Option<&str> {
        self.extract.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// One page fetch. `Ok(None)` for any non-200 answer.
#[async_trait]
trait PageFetcher: Send + Sync {
    async fn fetch(&self, page: &str) -> Result<Option<PageSummary>, AppError>;
}

#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl WikipediaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Lookup(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl PageFetcher for WikipediaClient {
    async fn fetch(&self, page: &str) -> Result<Option<PageSummary>, AppError> {
        let url = page_url(&self.base_url, page);
        debug!(%url, "Fetching reference summary");

        let request = async {
            let response = self.client.get(&url).send().await?;
            let status = response.status();
            debug!(%status, "Reference summary response");
            if status != StatusCode::OK {
                return Ok::<_, reqwest::Error>(None);
            }
            response.json::<PageSummary>().await.map(Some)
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| AppError::Lookup(format!("timed out fetching {page}")))?
            .map_err(|e| AppError::Lookup(format!("{page}: {e}")))
    }
}

#[async_trait]
impl ReferenceLookup for WikipediaClient {
    async fn summary(&self, name: &str) -> Result<Option<String>, AppError> {
        lookup_with_fallbacks(self, name).await
    }
}

/// The page goes in as a single encoded path segment.
fn page_url(base_url: &str, page: &str) -> String {
    format!("{base_url}/{}", urlencoding::encode(page))
}

/// "Harbour Systems " → "Harbour_Systems".
pub fn page_title(name: &str) -> String {
    name.trim().replace(' ', "_")
}

async fn lookup_with_fallbacks(
    fetcher: &dyn PageFetcher,
    name: &str,
) -> Result<Option<String>, AppError> {
    let title = page_title(name);
    if title.is_empty() {
        return Ok(None);
    }

    let mut page = fetcher.fetch(&title).await?;

    if page.as_ref().is_some_and(PageSummary::is_disambiguation) {
        debug!(%title, "Disambiguation page, retrying as company");
        page = fetcher.fetch(&format!("{title}_(company)")).await?;
    }

    // A real article without an extract is final; only missing or ambiguous pages retry.
    let settled = page.as_ref().is_some_and(|p| !p.is_disambiguation());
    if page.as_ref().and_then(PageSummary::extract).is_none() && !settled {
        debug!(%title, "No extract, trying organisation spellings");
        page = fetcher.fetch(&format!("{title}_(organisation)")).await?;
        if page.as_ref().and_then(PageSummary::extract).is_none() {
            page = fetcher.fetch(&format!("{title}_(organization)")).await?;
        }
    }

    Ok(page.as_ref().and_then(PageSummary::extract).map(str::to_string))
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct FakePages {
        pages: HashMap<&'static str, PageSummary>,
        requested: Mutex<Vec<String>>,
    }

    impl FakePages {
        fn with(mut self, page: &'static str, page_type: &str, extract: Option<&str>) -> Self {
            self.pages.insert(
                page,
                PageSummary {
                    page_type: page_type.to_string(),
                    extract: extract.map(str::to_string),
                },
            );
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for FakePages {
        async fn fetch(&self, page: &str) -> Result<Option<PageSummary>, AppError> {
            self.requested.lock().unwrap().push(page.to_string());
            Ok(self.pages.get(page).cloned())
        }
    }

    #[test]
    fn test_page_url_encodes_reserved_characters() {
        let base = "https://en.wikipedia.org/api/rest_v1/page/summary";
        assert_eq!(
            page_url(base, &page_title("What? Labs #1")),
            format!("{base}/What%3F_Labs_%231")
        );
        assert_eq!(page_url(base, "AC/DC"), format!("{base}/AC%2FDC"));
        assert_eq!(page_url(base, "Grab_Holdings"), format!("{base}/Grab_Holdings"));
    }

    #[test]
    fn test_page_title_uses_underscores() {
        assert_eq!(page_title("  Harbour Systems "), "Harbour_Systems");
    }

    #[tokio::test]
    async fn test_direct_hit_returns_extract() {
        let pages = FakePages::default().with("Grab_Holdings", "standard", Some("Grab is a company."));
        let summary = lookup_with_fallbacks(&pages, "Grab Holdings").await.unwrap();
        assert_eq!(summary.as_deref(), Some("Grab is a company."));
        assert_eq!(pages.requested(), vec!["Grab_Holdings"]);
    }

    #[tokio::test]
    async fn test_disambiguation_retries_as_company() {
        let pages = FakePages::default()
            .with("Cloudy", "disambiguation", Some("Cloudy may refer to:"))
            .with("Cloudy_(company)", "standard", Some("Cloudy is a cloud vendor."));
        let summary = lookup_with_fallbacks(&pages, "Cloudy").await.unwrap();
        assert_eq!(summary.as_deref(), Some("Cloudy is a cloud vendor."));
        assert_eq!(pages.requested(), vec!["Cloudy", "Cloudy_(company)"]);
    }

    #[tokio::test]
    async fn test_missing_page_tries_both_organisation_spellings() {
        let pages = FakePages::default().with("Keppel_(organization)", "standard", Some("Keppel builds."));
        let summary = lookup_with_fallbacks(&pages, "Keppel").await.unwrap();
        assert_eq!(summary.as_deref(), Some("Keppel builds."));
        assert_eq!(
            pages.requested(),
            vec!["Keppel", "Keppel_(organisation)", "Keppel_(organization)"]
        );
    }

    #[tokio::test]
    async fn test_nothing_found_is_none_not_error() {
        let pages = FakePages::default();
        assert_eq!(lookup_with_fallbacks(&pages, "Marina QA").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_article_without_extract_does_not_retry() {
        let pages = FakePages::default().with("Bukit_Apps", "standard", None);
        assert_eq!(lookup_with_fallbacks(&pages, "Bukit Apps").await.unwrap(), None);
        assert_eq!(pages.requested(), vec!["Bukit_Apps"]);
    }

    #[tokio::test]
    async fn test_blank_name_skips_network() {
        let pages = FakePages::default();
        assert_eq!(lookup_with_fallbacks(&pages, "   ").await.unwrap(), None);
        assert!(pages.requested().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_lookup_error() {
        let client = WikipediaClient::new("http://127.0.0.1:9/summary", Duration::from_secs(2)).unwrap();
        let err = client.summary("Lion City Tech").await.unwrap_err();
        assert!(matches!(err, AppError::Lookup(_)), "got {err:?}");
    }
}
