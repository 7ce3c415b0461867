//! Indexed documents.

use chrono::{DateTime, Utc};

/// What a document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
    Class,
    Interface,
    Typedef,
    Property,
    Method,
    Event,
    /// A reference page of a web documentation site.
    Page,
}

impl DocKind {
    /// Human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            DocKind::Class => "Class",
            DocKind::Interface => "Interface",
            DocKind::Typedef => "Typedef",
            DocKind::Property => "Property",
            DocKind::Method => "Method",
            DocKind::Event => "Event",
            DocKind::Page => "Page",
        }
    }

    /// Regional indicator emoji used to tag search options.
    pub const fn emoji(self) -> Option<&'static str> {
        match self {
            DocKind::Class => Some("🇨"),
            DocKind::Interface => Some("🇮"),
            DocKind::Typedef => Some("🇹"),
            DocKind::Property => Some("🇵"),
            DocKind::Method => Some("🇲"),
            DocKind::Event => Some("🇪"),
            DocKind::Page => None,
        }
    }
}

/// One searchable document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocRecord {
    /// Position in the source's document list.
    pub id: usize,
    /// Source-specific location (page path, or `Parent#member`).
    pub locator: String,
    /// Name shown to users.
    pub display_name: String,
    pub description: Option<String>,
    /// Hidden from ranked search unless explicitly requested.
    pub private: bool,
    pub kind: DocKind,
    /// Link to the document or its source code.
    pub source_url: Option<String>,
    /// Last modification time reported by the source.
    pub modified: Option<DateTime<Utc>>,
}

impl DocRecord {
    /// Creates a public record whose locator and display name are equal.
    pub fn new(id: usize, name: impl Into<String>, kind: DocKind) -> Self {
        let name = name.into();
        Self {
            id,
            locator: name.clone(),
            display_name: name,
            description: None,
            private: false,
            kind,
            source_url: None,
            modified: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}
