//! The documentation service shared by the lookup commands.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::cache::SearchCache;
use crate::config::DocsConfig;
use crate::error::FetchResult;
use crate::query::{SourceQuery, parse_source_query};
use crate::source::{MdnPageClient, PageFetcher, SitemapSource, VersionedDocsSource};

/// Name of the sitemap source in logs.
pub const MDN_SOURCE: &str = "mdn";

/// One cache per documentation set, plus the page fetcher.
///
/// Construction never fetches; every cache loads on first use.
pub struct DocsLibrary {
    mdn: Arc<SearchCache>,
    pages: Arc<dyn PageFetcher>,
    branches: BTreeMap<String, Arc<SearchCache>>,
    default_branch: String,
}

impl DocsLibrary {
    /// Creates a library with the given sitemap cache and no branches.
    pub fn new(
        mdn: Arc<SearchCache>,
        pages: Arc<dyn PageFetcher>,
        default_branch: impl Into<String>,
    ) -> Self {
        Self {
            mdn,
            pages,
            branches: BTreeMap::new(),
            default_branch: default_branch.into(),
        }
    }

    /// Adds (or replaces) a branch cache.
    pub fn with_branch(mut self, name: impl Into<String>, cache: Arc<SearchCache>) -> Self {
        self.branches.insert(name.into(), cache);
        self
    }

    /// Builds HTTP-backed caches for every configured source.
    pub fn from_config(config: &DocsConfig) -> FetchResult<Self> {
        let mdn = &config.mdn;
        let sitemap = SitemapSource::new(
            MDN_SOURCE,
            mdn.sitemap_url.clone(),
            mdn.base_url.clone(),
            mdn.request_timeout,
        )?;
        let pages = MdnPageClient::new(mdn.base_url.clone(), mdn.site_url.clone(), mdn.request_timeout)?;

        let mut library = Self::new(
            Arc::new(SearchCache::new(Arc::new(sitemap), Some(mdn.ttl))),
            Arc::new(pages),
            config.djs.default_branch.clone(),
        );

        for (name, branch) in &config.djs.branches {
            let source = VersionedDocsSource::new(
                name.clone(),
                branch.url.clone(),
                branch.source_url.clone(),
                config.djs.request_timeout,
            )?;
            let cache = Arc::new(SearchCache::new(Arc::new(source), config.djs.ttl));
            library = library.with_branch(name.clone(), cache);
        }

        debug!(branches = library.branches.len(), "Documentation library ready");
        Ok(library)
    }

    /// The sitemap cache.
    pub fn mdn(&self) -> &Arc<SearchCache> {
        &self.mdn
    }

    pub fn pages(&self) -> &dyn PageFetcher {
        self.pages.as_ref()
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    /// Cache of `name`, if the branch is known.
    pub fn branch(&self, name: &str) -> Option<&Arc<SearchCache>> {
        self.branches.get(name)
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Known branch names, sorted.
    pub fn branch_names(&self) -> impl Iterator<Item = &str> {
        self.branches.keys().map(String::as_str)
    }

    /// `name` if it is a known branch, else the default branch.
    pub fn resolve_branch<'a>(&'a self, name: Option<&'a str>) -> &'a str {
        match name {
            Some(name) if self.has_branch(name) => name,
            _ => &self.default_branch,
        }
    }

    /// Splits a `<branch>:<query>` lookup.
    pub fn parse_query<'a>(&'a self, text: &'a str) -> SourceQuery<'a> {
        parse_source_query(text, &self.default_branch, |b| self.has_branch(b))
    }
}

impl std::fmt::Debug for DocsLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsLibrary")
            .field("mdn", &self.mdn)
            .field("branches", &self.branches.keys().collect::<Vec<_>>())
            .field("default_branch", &self.default_branch)
            .finish()
    }
}
