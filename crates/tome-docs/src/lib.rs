//! Documentation search for the Tome bot.
//!
//! - [`DocumentSource`]: produces a documentation set's records
//!   ([`SitemapSource`], [`VersionedDocsSource`])
//! - [`SearchCache`]: TTL cache around one source, serving stale data when a
//!   refresh fails
//! - [`SearchEngine`]: exact-key lookup, then token-ranked search capped at
//!   [`MAX_RESULTS`]
//! - [`DocsLibrary`]: every cache of the bot, registered as a service

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod library;
pub mod query;
pub mod record;
pub mod source;

pub use cache::{CacheEntry, SearchCache};
pub use config::{BranchConfig, DjsConfig, DocsConfig, MdnConfig};
pub use engine::{MAX_RESULTS, SearchEngine, SearchOptions, SearchOutcome, SearchResult};
pub use error::{FetchError, FetchResult};
pub use index::{ExactKey, SearchIndex, tokenize};
pub use library::{DocsLibrary, MDN_SOURCE};
pub use query::{SourceQuery, parse_source_query};
pub use record::{DocKind, DocRecord};
pub use source::{
    DocumentSource, MdnPageClient, PageFetcher, PageSummary, SitemapSource, VersionedDocsSource,
    parse_docs,
};
