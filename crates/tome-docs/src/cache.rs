//! Refreshable per-source search index.
//!
//! A [`SearchCache`] owns one [`CacheEntry`] for one [`DocumentSource`].
//! [`SearchCache::get_index`] serves the entry while it is younger than the
//! TTL and refreshes it otherwise. A failed refresh is logged and the previous
//! entry, possibly empty, is served unchanged; `refreshed_at` only moves on
//! success.
//!
//! Refreshes are single-flight: callers arriving while a refresh is running
//! wait for it and take its result instead of fetching again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::engine::{SearchEngine, SearchOptions, SearchOutcome};
use crate::index::{ExactKey, SearchIndex};
use crate::record::DocRecord;
use crate::source::DocumentSource;

// =============================================================================
// CacheEntry
// =============================================================================

/// Immutable snapshot of a source's documents and their index.
#[derive(Debug, Default)]
pub struct CacheEntry {
    documents: Vec<DocRecord>,
    index: SearchIndex,
    refreshed_at: Option<Instant>,
}

impl CacheEntry {
    /// An entry that has never been loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A snapshot of `documents` loaded now.
    pub fn loaded(documents: Vec<DocRecord>, exact_key: ExactKey) -> Self {
        Self::build(documents, exact_key, Instant::now())
    }

    fn build(documents: Vec<DocRecord>, exact_key: ExactKey, now: Instant) -> Self {
        let index = SearchIndex::build(&documents, exact_key);
        Self {
            documents,
            index,
            refreshed_at: Some(now),
        }
    }

    pub fn documents(&self) -> &[DocRecord] {
        &self.documents
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Time of the last successful refresh.
    pub fn refreshed_at(&self) -> Option<Instant> {
        self.refreshed_at
    }

    /// Returns `true` once any refresh has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.refreshed_at.is_some()
    }

    /// Returns `true` if the entry may be served without refreshing.
    ///
    /// Without a TTL an entry is never fresh.
    pub fn is_fresh(&self, ttl: Option<Duration>, now: Instant) -> bool {
        match (self.refreshed_at, ttl) {
            (Some(at), Some(ttl)) => now.saturating_duration_since(at) < ttl,
            _ => false,
        }
    }

    /// Runs `query` against this snapshot.
    pub fn search(&self, query: &str, options: &SearchOptions) -> SearchOutcome {
        SearchEngine::new(&self.documents, &self.index).search(query, options)
    }

    /// Returns the record with the given display name.
    pub fn find(&self, display_name: &str) -> Option<&DocRecord> {
        self.documents.iter().find(|d| d.display_name == display_name)
    }
}

// =============================================================================
// SearchCache
// =============================================================================

/// TTL cache around one documentation source.
pub struct SearchCache {
    source: Arc<dyn DocumentSource>,
    ttl: Option<Duration>,
    entry: RwLock<Arc<CacheEntry>>,
    refresh_lock: Mutex<()>,
    completed_refreshes: AtomicU64,
    fetches: AtomicU64,
}

impl SearchCache {
    /// Creates an empty cache. Nothing is fetched until the first lookup.
    ///
    /// `ttl = None` refetches on every [`get_index`](Self::get_index) call.
    pub fn new(source: Arc<dyn DocumentSource>, ttl: Option<Duration>) -> Self {
        Self {
            source,
            ttl,
            entry: RwLock::new(Arc::new(CacheEntry::empty())),
            refresh_lock: Mutex::new(()),
            completed_refreshes: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Current entry, without refreshing.
    pub fn snapshot(&self) -> Arc<CacheEntry> {
        self.entry.read().clone()
    }

    /// Number of fetches issued to the source.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Time of the last successful refresh.
    pub fn last_refreshed(&self) -> Option<Instant> {
        self.snapshot().refreshed_at()
    }

    /// Returns the entry, refreshing it first if it is stale.
    ///
    /// Never fails: on fetch failure the previous entry is returned.
    pub async fn get_index(&self) -> Arc<CacheEntry> {
        let current = self.snapshot();
        if current.is_fresh(self.ttl, Instant::now()) {
            return current;
        }

        let seen = self.completed_refreshes.load(Ordering::SeqCst);
        let _guard = self.refresh_lock.lock().await;
        if self.completed_refreshes.load(Ordering::SeqCst) != seen {
            debug!(source = %self.name(), "Reusing result of concurrent refresh");
            return self.snapshot();
        }

        let entry = self.refresh().await;
        self.completed_refreshes.fetch_add(1, Ordering::SeqCst);
        entry
    }

    /// Returns the entry, fetching only if the source was never loaded.
    pub async fn get_cached(&self) -> Arc<CacheEntry> {
        let current = self.snapshot();
        if current.is_loaded() {
            current
        } else {
            self.get_index().await
        }
    }

    /// Refreshes if stale, then runs `query`.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> SearchOutcome {
        self.get_index().await.search(query, options)
    }

    async fn refresh(&self) -> Arc<CacheEntry> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let started = Instant::now();

        match self.source.fetch().await {
            Ok(documents) => {
                let count = documents.len();
                let entry = Arc::new(CacheEntry::build(
                    documents,
                    self.source.exact_key(),
                    Instant::now(),
                ));
                *self.entry.write() = entry.clone();
                info!(
                    source = %self.name(),
                    documents = count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Refreshed documentation index"
                );
                entry
            }
            Err(e) => {
                let previous = self.snapshot();
                warn!(
                    source = %self.name(),
                    error = %e,
                    stale = previous.is_loaded(),
                    "Failed to refresh documentation index, serving previous data"
                );
                previous
            }
        }
    }
}

impl std::fmt::Debug for SearchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCache")
            .field("source", &self.name())
            .field("ttl", &self.ttl)
            .field("documents", &self.snapshot().documents().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{FetchError, FetchResult};
    use crate::record::DocKind;

    /// Source answering from a script; an exhausted script repeats the last answer.
    struct ScriptedSource {
        script: parking_lot::Mutex<VecDeque<FetchResult<Vec<DocRecord>>>>,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(script: Vec<FetchResult<Vec<DocRecord>>>) -> Self {
            Self {
                script: parking_lot::Mutex::new(script.into()),
                delay: Duration::ZERO,
            }
        }

        fn delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl DocumentSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        fn exact_key(&self) -> ExactKey {
            ExactKey::Identifier
        }

        async fn fetch(&self) -> FetchResult<Vec<DocRecord>> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.pop_front().unwrap_or_else(|| Ok(vec![]))
            } else {
                script.front().cloned().unwrap_or_else(|| Ok(vec![]))
            }
        }
    }

    fn docs(names: &[&str]) -> Vec<DocRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| DocRecord::new(i, *n, DocKind::Class))
            .collect()
    }

    fn outage() -> FetchError {
        FetchError::Status {
            url: "https://example.test/sitemap.xml.gz".into(),
            status: 503,
        }
    }

    const TTL: Duration = Duration::from_secs(12 * 60 * 60);

    #[tokio::test(start_paused = true)]
    async fn test_within_ttl_fetches_once() {
        let cache = SearchCache::new(Arc::new(ScriptedSource::new(vec![Ok(docs(&["Client"]))])), Some(TTL));
        let first = cache.get_index().await;
        tokio::time::advance(Duration::from_secs(60)).await;
        let second = cache.get_index().await;
        assert_eq!(cache.fetch_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_ttl_refetches() {
        let source = ScriptedSource::new(vec![Ok(docs(&["Client"])), Ok(docs(&["Client", "Guild"]))]);
        let cache = SearchCache::new(Arc::new(source), Some(TTL));
        assert_eq!(cache.get_index().await.documents().len(), 1);
        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(cache.get_index().await.documents().len(), 2);
        assert_eq!(cache.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_previous_entry() {
        let source = ScriptedSource::new(vec![Ok(docs(&["Client"])), Err(outage())]);
        let cache = SearchCache::new(Arc::new(source), Some(TTL));
        let first = cache.get_index().await;
        let refreshed = cache.last_refreshed();

        tokio::time::advance(TTL * 2).await;
        let second = cache.get_index().await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.last_refreshed(), refreshed);

        // Still stale, so the next call tries again and fails again.
        let third = cache.get_index().await;
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(cache.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_failure_without_data_serves_empty_entry() {
        let cache = SearchCache::new(Arc::new(ScriptedSource::new(vec![Err(outage())])), Some(TTL));
        let entry = cache.get_index().await;
        assert!(!entry.is_loaded());
        assert!(entry.documents().is_empty());
        assert_eq!(cache.search("Client", &SearchOptions::default()).await, SearchOutcome::Empty);
    }

    #[tokio::test]
    async fn test_without_ttl_every_call_fetches() {
        let cache = SearchCache::new(Arc::new(ScriptedSource::new(vec![Ok(docs(&["Client"]))])), None);
        cache.get_index().await;
        cache.get_index().await;
        assert_eq!(cache.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_get_cached_fetches_only_when_unloaded() {
        let cache = SearchCache::new(Arc::new(ScriptedSource::new(vec![Ok(docs(&["Client"]))])), None);
        cache.get_cached().await;
        cache.get_cached().await;
        assert_eq!(cache.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refresh_is_single_flight() {
        let source = ScriptedSource::new(vec![Ok(docs(&["Client"]))]).delay(Duration::from_millis(500));
        let cache = Arc::new(SearchCache::new(Arc::new(source), Some(TTL)));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_index().await })
            })
            .collect();
        let mut entries = Vec::new();
        for task in tasks {
            entries.push(task.await.unwrap());
        }

        assert_eq!(cache.fetch_count(), 1);
        assert!(entries.iter().all(|e| Arc::ptr_eq(e, &entries[0])));
    }

    #[tokio::test]
    async fn test_search_through_cache() {
        let cache = SearchCache::new(
            Arc::new(ScriptedSource::new(vec![Ok(docs(&["Client", "ClientUser"]))])),
            Some(TTL),
        );
        let outcome = cache.search("Client", &SearchOptions::default()).await;
        assert!(matches!(outcome, SearchOutcome::Exact(ref d) if d.display_name == "Client"));
    }
}
