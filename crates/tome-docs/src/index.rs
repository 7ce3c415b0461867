//! Token index over a document list.
//!
//! Text is split into tokens on every non-alphanumeric character and on
//! camelCase boundaries, then lowercased; the unsplit word is kept as well.
//! `Web/API/fetchLater` yields `web`, `api`, `fetchlater`, `fetch`, `later`.
//!
//! Exact lookups use a separate key table whose normalisation depends on the
//! source (see [`ExactKey`]). For identifier sources, a query spelling out a
//! display name (ignoring case) resolves to that document before
//! normalisation, so `Client#event:ready` finds the event even when a
//! `Client#ready` property holds the normalised key.

use std::collections::HashMap;

use crate::record::DocRecord;

/// How a source resolves a query to exactly one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExactKey {
    /// Case-insensitive identifier path: `.` and `#` are interchangeable,
    /// and trailing `()` and `event:` markers are ignored.
    /// `client.login`, `Client#login()` and `CLIENT#login` are the same key.
    Identifier,
    /// The locator itself, compared after trimming.
    Locator,
}

impl ExactKey {
    /// Normalises free text (a query) into a lookup key.
    pub fn normalize(self, text: &str) -> String {
        match self {
            ExactKey::Identifier => text
                .trim()
                .to_lowercase()
                .replace('.', "#")
                .replace("event:", "")
                .replace("()", ""),
            ExactKey::Locator => text.trim().to_string(),
        }
    }

    /// Returns the key a record is stored under.
    pub fn record_key(self, record: &DocRecord) -> String {
        match self {
            ExactKey::Identifier => self.normalize(&record.display_name),
            ExactKey::Locator => self.normalize(&record.locator),
        }
    }
}

/// Splits text into lowercase search tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let whole = word.to_lowercase();
        let parts = split_camel(word);
        if parts.len() > 1 {
            tokens.extend(parts.into_iter().map(|p| p.to_lowercase()));
        }
        tokens.push(whole);
    }
    tokens.sort();
    tokens.dedup();
    tokens
}

fn split_camel(word: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    for (i, c) in word.char_indices() {
        if let Some(p) = prev {
            if c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()) {
                parts.push(&word[start..i]);
                start = i;
            }
        }
        prev = Some(c);
    }
    parts.push(&word[start..]);
    parts
}

/// Maps tokens to the documents containing them.
#[derive(Debug, Default, Clone)]
pub struct SearchIndex {
    postings: HashMap<String, Vec<usize>>,
    /// Lowercased display names, for [`ExactKey::Identifier`] only.
    verbatim: HashMap<String, usize>,
    exact: HashMap<String, usize>,
    exact_key: Option<ExactKey>,
}

impl SearchIndex {
    /// Builds the index for `documents`.
    ///
    /// Documents are indexed by locator and display name. When two documents
    /// share a display name or an exact key, the earlier one wins.
    pub fn build(documents: &[DocRecord], exact_key: ExactKey) -> Self {
        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        let mut verbatim = HashMap::with_capacity(documents.len());
        let mut exact = HashMap::with_capacity(documents.len());

        for (position, doc) in documents.iter().enumerate() {
            let mut tokens = tokenize(&doc.locator);
            if doc.display_name != doc.locator {
                tokens.extend(tokenize(&doc.display_name));
                tokens.sort();
                tokens.dedup();
            }
            for token in tokens {
                postings.entry(token).or_default().push(position);
            }
            if exact_key == ExactKey::Identifier {
                verbatim
                    .entry(doc.display_name.trim().to_lowercase())
                    .or_insert(position);
            }
            exact.entry(exact_key.record_key(doc)).or_insert(position);
        }

        Self {
            postings,
            verbatim,
            exact,
            exact_key: Some(exact_key),
        }
    }

    /// Resolves `query` to a document position, by display name first and
    /// then by exact key.
    pub fn exact(&self, query: &str) -> Option<usize> {
        let exact_key = self.exact_key?;
        self.verbatim
            .get(&query.trim().to_lowercase())
            .or_else(|| self.exact.get(&exact_key.normalize(query)))
            .copied()
    }

    /// Iterates `(token, positions)` pairs.
    pub fn postings(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.postings.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    /// Number of distinct tokens.
    pub fn vocabulary_len(&self) -> usize {
        self.postings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DocKind;

    #[test]
    fn test_tokenize_paths_and_camel_case() {
        assert_eq!(
            tokenize("Web/API/fetchLater"),
            vec!["api", "fetch", "fetchlater", "later", "web"]
        );
        assert_eq!(tokenize("Client#isReady()"), vec!["client", "is", "isready", "ready"]);
        assert!(tokenize("  //  ").is_empty());
    }

    #[test]
    fn test_identifier_keys() {
        let key = ExactKey::Identifier;
        assert_eq!(key.normalize("client.login"), "client#login");
        assert_eq!(key.normalize("Client#login()"), "client#login");
        assert_eq!(key.normalize(" Client#event:ready "), "client#ready");
    }

    #[test]
    fn test_exact_lookup_first_wins() {
        let docs = vec![
            DocRecord::new(0, "Client", DocKind::Class),
            DocRecord::new(1, "Client#ready", DocKind::Property),
            DocRecord::new(2, "Client#event:ready", DocKind::Event),
        ];
        let index = SearchIndex::build(&docs, ExactKey::Identifier);
        assert_eq!(index.exact("client"), Some(0));
        assert_eq!(index.exact("Client.ready"), Some(1));
        assert_eq!(index.exact("Guild"), None);
    }

    #[test]
    fn test_display_name_beats_shared_key() {
        let docs = vec![
            DocRecord::new(0, "Shard#ready", DocKind::Property),
            DocRecord::new(1, "Shard#event:ready", DocKind::Event),
            DocRecord::new(2, "Shard#spawn()", DocKind::Method),
        ];
        let index = SearchIndex::build(&docs, ExactKey::Identifier);
        assert_eq!(index.exact("Shard#event:ready"), Some(1));
        assert_eq!(index.exact(" shard#EVENT:ready "), Some(1));
        assert_eq!(index.exact("Shard#ready"), Some(0));
        assert_eq!(index.exact("shard.ready"), Some(0));
        assert_eq!(index.exact("Shard#spawn()"), Some(2));
        assert_eq!(index.exact("shard.spawn"), Some(2));
    }

    #[test]
    fn test_empty_index_has_no_exact_matches() {
        assert_eq!(SearchIndex::default().exact("anything"), None);
    }
}
