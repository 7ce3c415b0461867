//! On-demand page detail for sitemap documents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// Summary of one documentation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub title: String,
    /// Absolute link to the rendered page.
    pub url: String,
    /// Page summary, may contain markup.
    pub summary: String,
}

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    doc: PageDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageDoc {
    page_title: String,
    #[serde(rename = "mdn_url")]
    mdn_url: String,
    #[serde(default)]
    summary: String,
}

/// Resolves a page locator to its summary.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, locator: &str) -> FetchResult<PageSummary>;
}

/// Fetches `<base_url><locator>/index.json` page documents.
#[derive(Debug, Clone)]
pub struct MdnPageClient {
    client: Client,
    base_url: String,
    site_url: String,
}

impl MdnPageClient {
    /// `base_url` prefixes locators; `site_url` prefixes the page's own path.
    pub fn new(
        base_url: impl Into<String>,
        site_url: impl Into<String>,
        timeout: Duration,
    ) -> FetchResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            site_url: site_url.into(),
        })
    }
}

#[async_trait]
impl PageFetcher for MdnPageClient {
    async fn fetch_page(&self, locator: &str) -> FetchResult<PageSummary> {
        let url = format!("{}{}/index.json", self.base_url, locator);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::transport(&url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(|e| FetchError::transport(&url, e))?;
        let envelope: PageEnvelope = serde_json::from_slice(&body)?;
        debug!(locator = %locator, "Fetched page summary");

        let doc = envelope.doc;
        Ok(PageSummary {
            title: doc.page_title,
            url: format!(
                "{}/{}",
                self.site_url.trim_end_matches('/'),
                doc.mdn_url.trim_start_matches('/')
            ),
            summary: doc.summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::Server) -> MdnPageClient {
        MdnPageClient::new(
            format!("{}/en-US/docs/", server.url()),
            "https://developer.mozilla.org",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/en-US/docs/Web/API/fetch/index.json")
            .with_status(200)
            .with_body(
                r#"{"doc":{"pageTitle":"fetch() - Web APIs | MDN","mdn_url":"/en-US/docs/Web/API/fetch",
                "summary":"The global <code>fetch()</code> method starts fetching a resource.","popularity":0.5}}"#,
            )
            .create_async()
            .await;

        let page = client(&server).fetch_page("Web/API/fetch").await.unwrap();
        mock.assert_async().await;
        assert_eq!(page.title, "fetch() - Web APIs | MDN");
        assert_eq!(page.url, "https://developer.mozilla.org/en-US/docs/Web/API/fetch");
        assert!(page.summary.starts_with("The global"));
    }

    #[tokio::test]
    async fn test_missing_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/en-US/docs/Nope/index.json")
            .with_status(404)
            .create_async()
            .await;
        let err = client(&server).fetch_page("Nope").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unexpected_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/en-US/docs/Odd/index.json")
            .with_status(200)
            .with_body(r#"{"hits":[]}"#)
            .create_async()
            .await;
        let err = client(&server).fetch_page("Odd").await.unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }
}
