//! Documentation sources.
//!
//! A [`DocumentSource`] produces the full, ordered document list of one
//! documentation set. Sources are stateless; caching lives in
//! [`SearchCache`](crate::SearchCache).

mod page;
mod sitemap;
mod versioned;

pub use page::{MdnPageClient, PageFetcher, PageSummary};
pub use sitemap::SitemapSource;
pub use versioned::{VersionedDocsSource, parse_docs};

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::index::ExactKey;
use crate::record::DocRecord;

/// Supplies the documents of one documentation set.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// How queries against this source resolve to an exact document.
    fn exact_key(&self) -> ExactKey;

    /// Fetches the current document list.
    async fn fetch(&self) -> FetchResult<Vec<DocRecord>>;
}
