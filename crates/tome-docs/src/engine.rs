//! Query evaluation over an indexed document list.
//!
//! A query first tries the exact-key table. When that misses, every query
//! token must match some index token; each match scores 3 for an equal token,
//! 2 for a prefix and 1 for a substring. Results are ordered by score, then by
//! shorter display name, then by document order.

use std::collections::HashMap;

use crate::index::{SearchIndex, tokenize};
use crate::record::{DocKind, DocRecord};

/// Upper bound on ranked results, fixed by the platform's option count.
pub const MAX_RESULTS: usize = 25;

/// Per-query switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Include records flagged private in ranked results.
    pub include_private: bool,
    /// Maximum ranked results, clamped to [`MAX_RESULTS`].
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_private: false,
            limit: MAX_RESULTS,
        }
    }
}

impl SearchOptions {
    pub fn include_private(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: usize,
    pub display_name: String,
    pub locator: String,
    pub kind: DocKind,
    /// Description of the record, if any.
    pub snippet: Option<String>,
    pub score: u32,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The query named exactly one record.
    Exact(DocRecord),
    /// Ranked candidates, best first, never more than [`MAX_RESULTS`].
    Ranked(Vec<SearchResult>),
    /// Nothing matched.
    Empty,
}

impl SearchOutcome {
    /// Number of records in the outcome.
    pub fn len(&self) -> usize {
        match self {
            SearchOutcome::Exact(_) => 1,
            SearchOutcome::Ranked(results) => results.len(),
            SearchOutcome::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Evaluates queries against one source's documents.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    documents: &'a [DocRecord],
    index: &'a SearchIndex,
}

impl<'a> SearchEngine<'a> {
    pub fn new(documents: &'a [DocRecord], index: &'a SearchIndex) -> Self {
        Self { documents, index }
    }

    /// Runs `query`.
    ///
    /// An exact key match is returned on its own, even if it is private and
    /// other candidates exist.
    pub fn search(&self, query: &str, options: &SearchOptions) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Empty;
        }

        if let Some(doc) = self.index.exact(query).and_then(|p| self.documents.get(p)) {
            return SearchOutcome::Exact(doc.clone());
        }

        let ranked = self.rank(query, options);
        if ranked.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Ranked(ranked)
        }
    }

    fn rank(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Vec::new();
        }

        // position -> (terms matched, summed best score)
        let mut hits: HashMap<usize, (usize, u32)> = HashMap::new();
        for term in &terms {
            let mut best: HashMap<usize, u32> = HashMap::new();
            for (token, positions) in self.index.postings() {
                let score = match_score(term, token);
                if score == 0 {
                    continue;
                }
                for &position in positions {
                    let slot = best.entry(position).or_insert(0);
                    *slot = (*slot).max(score);
                }
            }
            for (position, score) in best {
                let hit = hits.entry(position).or_insert((0, 0));
                hit.0 += 1;
                hit.1 += score;
            }
        }

        let mut matched: Vec<(usize, u32)> = hits
            .into_iter()
            .filter(|(_, (count, _))| *count == terms.len())
            .map(|(position, (_, score))| (position, score))
            .filter(|(position, _)| {
                self.documents
                    .get(*position)
                    .is_some_and(|d| options.include_private || !d.private)
            })
            .collect();

        matched.sort_by(|(pa, sa), (pb, sb)| {
            let la = self.documents[*pa].display_name.len();
            let lb = self.documents[*pb].display_name.len();
            sb.cmp(sa).then(la.cmp(&lb)).then(pa.cmp(pb))
        });
        matched.truncate(options.limit.min(MAX_RESULTS));

        matched
            .into_iter()
            .map(|(position, score)| {
                let doc = &self.documents[position];
                SearchResult {
                    id: doc.id,
                    display_name: doc.display_name.clone(),
                    locator: doc.locator.clone(),
                    kind: doc.kind,
                    snippet: doc.description.clone(),
                    score,
                }
            })
            .collect()
    }
}

fn match_score(term: &str, token: &str) -> u32 {
    if token == term {
        3
    } else if token.starts_with(term) {
        2
    } else if token.contains(term) {
        1
    } else {
        0
    }
}
