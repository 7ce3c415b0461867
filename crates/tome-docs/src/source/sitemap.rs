//! Remote sitemap source.
//!
//! Downloads a (usually gzip-compressed) XML sitemap and turns every `<url>`
//! entry into a [`DocKind::Page`] record whose locator is the `<loc>` with the
//! documentation base URL stripped.

use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use tracing::debug;

use super::DocumentSource;
use crate::error::{FetchError, FetchResult};
use crate::index::ExactKey;
use crate::record::{DocKind, DocRecord};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Deserialize)]
struct UrlSet {
    #[serde(rename = "url", default)]
    urls: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    loc: String,
    #[serde(default)]
    lastmod: Option<String>,
}

/// Sitemap-backed document source.
#[derive(Debug, Clone)]
pub struct SitemapSource {
    name: String,
    client: Client,
    sitemap_url: String,
    base_url: String,
}

impl SitemapSource {
    /// Creates a source reading `sitemap_url`; locators are relative to `base_url`.
    pub fn new(
        name: impl Into<String>,
        sitemap_url: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> FetchResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            name: name.into(),
            client,
            sitemap_url: sitemap_url.into(),
            base_url: base_url.into(),
        })
    }

    async fn download(&self) -> FetchResult<Vec<u8>> {
        let url = &self.sitemap_url;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(|e| FetchError::transport(url, e))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DocumentSource for SitemapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn exact_key(&self) -> ExactKey {
        ExactKey::Locator
    }

    async fn fetch(&self) -> FetchResult<Vec<DocRecord>> {
        let body = self.download().await?;
        debug!(source = %self.name, bytes = body.len(), "Downloaded sitemap");

        let xml = tokio::task::spawn_blocking(move || decode_body(body))
            .await
            .map_err(|e| FetchError::Decompress(e.to_string()))??;
        parse_sitemap(&xml, &self.base_url)
    }
}

/// Gunzips `body` if it carries the gzip magic, then decodes it as UTF-8.
fn decode_body(body: Vec<u8>) -> FetchResult<String> {
    if body.starts_with(&GZIP_MAGIC) {
        let mut xml = String::new();
        GzDecoder::new(body.as_slice())
            .read_to_string(&mut xml)
            .map_err(|e| FetchError::Decompress(e.to_string()))?;
        Ok(xml)
    } else {
        String::from_utf8(body).map_err(|e| FetchError::Decompress(e.to_string()))
    }
}

/// Parses sitemap XML into page records, in document order.
pub(crate) fn parse_sitemap(xml: &str, base_url: &str) -> FetchResult<Vec<DocRecord>> {
    let set: UrlSet = quick_xml::de::from_str(xml).map_err(|e| FetchError::Xml(e.to_string()))?;

    Ok(set
        .urls
        .into_iter()
        .enumerate()
        .map(|(id, entry)| {
            let locator = entry
                .loc
                .strip_prefix(base_url)
                .unwrap_or(&entry.loc)
                .to_string();
            let mut record = DocRecord::new(id, locator, DocKind::Page).source_url(entry.loc.clone());
            record.modified = entry
                .lastmod
                .as_deref()
                .and_then(|m| DateTime::parse_from_rfc3339(m).ok())
                .map(|m| m.with_timezone(&Utc));
            record
        })
        .collect())
}
