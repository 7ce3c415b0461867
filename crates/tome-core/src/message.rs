//! Outbound payloads: replies, embeds and message components.
//!
//! These are plain serialisable values; the platform adapter renders them.
//! Platform limits that callers must respect are exposed as constants and
//! checked by [`Embed::within_limits`].

use serde::Serialize;

// =============================================================================
// Limits
// =============================================================================

/// Maximum length of a select option label, value or description, and of an
/// autocomplete choice name or value.
pub const OPTION_TEXT_LIMIT: usize = 100;
/// Maximum number of select options or autocomplete choices.
pub const MAX_CHOICES: usize = 25;
/// Maximum length of a component custom id.
pub const CUSTOM_ID_LIMIT: usize = 100;

const EMBED_TITLE_LIMIT: usize = 256;
const EMBED_DESCRIPTION_LIMIT: usize = 4096;
const EMBED_FIELD_COUNT_LIMIT: usize = 25;
const EMBED_FIELD_NAME_LIMIT: usize = 256;
const EMBED_FIELD_VALUE_LIMIT: usize = 1024;
const EMBED_FOOTER_LIMIT: usize = 2048;
const EMBED_AUTHOR_LIMIT: usize = 256;
const EMBED_TOTAL_LIMIT: usize = 6000;

/// Shortens `text` to at most `max_chars` characters, replacing the tail with
/// `...` when it has to cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

// =============================================================================
// Embeds
// =============================================================================

/// Author line of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedAuthor {
    /// Author name.
    pub name: String,
    /// Link on the author name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Icon shown next to the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// A name/value field of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    /// Field name.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Whether the field is laid out inline.
    #[serde(default)]
    pub inline: bool,
}

/// Rich embed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    /// ISO 8601 timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Creates an empty embed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn author(mut self, name: impl Into<String>, icon_url: Option<String>) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            url: None,
            icon_url,
        });
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    /// Appends a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Total character count the platform charges against the embed limit.
    pub fn total_len(&self) -> usize {
        let opt = |s: &Option<String>| s.as_deref().map_or(0, char_len);
        opt(&self.title)
            + opt(&self.description)
            + opt(&self.footer)
            + self.author.as_ref().map_or(0, |a| char_len(&a.name))
            + self
                .fields
                .iter()
                .map(|f| char_len(&f.name) + char_len(&f.value))
                .sum::<usize>()
    }

    /// Returns `true` if every platform embed limit is respected.
    pub fn within_limits(&self) -> bool {
        let fits = |s: &Option<String>, limit| s.as_deref().is_none_or(|s| char_len(s) <= limit);
        fits(&self.title, EMBED_TITLE_LIMIT)
            && fits(&self.description, EMBED_DESCRIPTION_LIMIT)
            && fits(&self.footer, EMBED_FOOTER_LIMIT)
            && self
                .author
                .as_ref()
                .is_none_or(|a| char_len(&a.name) <= EMBED_AUTHOR_LIMIT)
            && self.fields.len() <= EMBED_FIELD_COUNT_LIMIT
            && self.fields.iter().all(|f| {
                char_len(&f.name) <= EMBED_FIELD_NAME_LIMIT
                    && char_len(&f.value) <= EMBED_FIELD_VALUE_LIMIT
            })
            && self.total_len() <= EMBED_TOTAL_LIMIT
    }

    /// Drops every field but the last one.
    pub fn keep_last_field(&mut self) {
        if let Some(last) = self.fields.pop() {
            self.fields = vec![last];
        }
    }
}

// =============================================================================
// Components
// =============================================================================

/// Visual style of an interactive button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

/// One option of a select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl SelectOption {
    /// Creates an option whose label and value are both `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            value: text,
            description: None,
            emoji: None,
        }
    }

    /// Replaces the value submitted when this option is picked.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }
}

/// A message component. Every component occupies its own action row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    /// Interactive button.
    Button {
        custom_id: String,
        style: ButtonStyle,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        emoji: Option<String>,
    },
    /// Button that opens a URL.
    Link { url: String, label: String },
    /// String select menu.
    SelectMenu {
        custom_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        options: Vec<SelectOption>,
    },
}

impl Component {
    /// Returns the custom id of an interactive component.
    pub fn custom_id(&self) -> Option<&str> {
        match self {
            Component::Button { custom_id, .. } | Component::SelectMenu { custom_id, .. } => {
                Some(custom_id)
            }
            Component::Link { .. } => None,
        }
    }
}

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutocompleteChoice {
    pub name: String,
    pub value: String,
}

impl AutocompleteChoice {
    /// Creates a choice, truncating name and value to the platform limit.
    pub fn new(name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        Self {
            name: truncate(name.as_ref(), OPTION_TEXT_LIMIT),
            value: truncate(value.as_ref(), OPTION_TEXT_LIMIT),
        }
    }
}

// =============================================================================
// Replies
// =============================================================================

/// A message body, used for interaction replies, edits and channel messages.
///
/// When used as an edit, `components` replaces the existing components; an
/// empty list removes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    pub components: Vec<Component>,
    /// Only the invoking user sees the reply.
    pub ephemeral: bool,
}

impl Reply {
    /// Creates an empty reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a text-only reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Creates a reply carrying one embed.
    pub fn with_embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}
