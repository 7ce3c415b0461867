//! `/djs`: discord.js documentation lookup.
//!
//! Options: `query` (required, autocompleted), `source` (branch), `target`
//! (user the docs are meant for) and `private` (include private members).
//! The query may carry its branch as `<branch>:<query>`; the `source` option
//! wins over the prefix.

use std::sync::Arc;

use tome_core::custom_id::{CorrelationRecord, parse_field, parse_optional_field};
use tome_core::{
    AutocompleteChoice, Component, CustomIdResult, Embed, OPTION_TEXT_LIMIT, Permission,
    Permissions, Reply, SelectOption, UserId, truncate,
};
use tome_docs::{CacheEntry, DocRecord, DocsLibrary, SearchOptions, SearchOutcome, SearchResult};
use tome_framework::{BoxError, CommandModule, HandlerDescriptor, InteractionContext, ModuleDescriptor};
use tracing::debug;

use super::{SELECT_PLACEHOLDER, SELECT_PROMPT, deliver};
use crate::present::{option_description, shorten_query};

/// Command name.
pub const COMMAND: &str = "djs";
/// Handler key of the result picker.
pub const SELECT_KEY: &str = "djsselect";

pub const MODULE: ModuleDescriptor = ModuleDescriptor::new(COMMAND, build);

const FETCH_FAILED: &str = "Couldn't fetch docs";
const NOT_FOUND: &str = "Didn't find any results for that query";

const EMBED_COLOR: u32 = 0x2296f3;
const ICON_URL: &str = "https://discord.js.org/favicon.ico";
const DOCS_URL: &str = "https://discord.js.org/#/docs";
const EMBED_DESCRIPTION_LIMIT: usize = 4096;

fn build() -> Result<CommandModule, BoxError> {
    Ok(CommandModule::new()
        .command(
            HandlerDescriptor::command(COMMAND, run)
                .bot_permissions(Permissions::from([Permission::SendMessages, Permission::EmbedLinks])),
        )
        .select_menu(HandlerDescriptor::select_menu(SELECT_KEY, on_select))
        .autocomplete(HandlerDescriptor::autocomplete(COMMAND, "query", suggest)))
}

// =============================================================================
// Correlation id
// =============================================================================

/// State carried by the result picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DjsSelectId {
    pub branch: String,
    pub include_private: bool,
    pub initiator: UserId,
    pub target: Option<UserId>,
}

impl CorrelationRecord for DjsSelectId {
    const KEY: &'static str = SELECT_KEY;
    const VERSION: u32 = 2;
    const FIELD_COUNT: usize = 4;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.branch.clone(),
            self.include_private.to_string(),
            self.initiator.to_string(),
            self.target.map(|t| t.to_string()).unwrap_or_default(),
        ]
    }

    fn from_fields(fields: &[String]) -> CustomIdResult<Self> {
        Ok(Self {
            branch: parse_field::<Self, _>(fields, 0)?,
            include_private: parse_field::<Self, _>(fields, 1)?,
            initiator: parse_field::<Self, _>(fields, 2)?,
            target: parse_optional_field::<Self, _>(fields, 3)?,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn run(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
    let command = ctx.command().ok_or("djs invoked without command data")?;
    let docs = ctx.require_service::<DocsLibrary>()?;

    let raw_query = command.string("query").unwrap_or_default();
    let parsed = docs.parse_query(raw_query);
    let branch = match command.string("source") {
        Some(source) if docs.has_branch(source) => source,
        _ => parsed.branch,
    };
    let include_private = command.boolean("private").unwrap_or(false);
    let target = command.user("target");

    let Some(entry) = load(&docs, branch).await else {
        ctx.respond(Reply::text(FETCH_FAILED)).await?;
        return Ok(());
    };

    let options = SearchOptions::default().include_private(include_private);
    match entry.search(parsed.query, &options) {
        SearchOutcome::Exact(record) => {
            debug!(branch, name = %record.display_name, "Exact match");
            let confirmation = format!("Sent documentations for {}", shorten_query(parsed.query));
            deliver(&ctx, ctx.user().id, target, record_embed(branch, &record), confirmation).await
        }
        SearchOutcome::Ranked(results) => {
            let id = DjsSelectId {
                branch: branch.to_string(),
                include_private,
                initiator: ctx.user().id,
                target,
            };
            let menu = Component::SelectMenu {
                custom_id: id.encode()?,
                placeholder: Some(SELECT_PLACEHOLDER.into()),
                options: results.iter().map(select_option).collect(),
            };
            ctx.respond(Reply::text(SELECT_PROMPT).component(menu)).await?;
            Ok(())
        }
        SearchOutcome::Empty => {
            ctx.respond(Reply::with_embed(base_embed(branch).description(NOT_FOUND)))
                .await?;
            Ok(())
        }
    }
}

async fn on_select(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
    let component = ctx.component().ok_or("djs select invoked without component data")?;
    let id = DjsSelectId::decode(&component.custom_id)?;
    let selected = component.values.first().ok_or("djs select submitted without a value")?;
    let docs = ctx.require_service::<DocsLibrary>()?;

    let Some(entry) = load(&docs, &id.branch).await else {
        ctx.respond(Reply::text(FETCH_FAILED)).await?;
        return Ok(());
    };

    let Some(record) = resolve_selection(&entry, selected, id.include_private) else {
        ctx.respond(Reply::with_embed(base_embed(&id.branch).description(NOT_FOUND)))
            .await?;
        return Ok(());
    };

    let confirmation = format!("Sent documentations for {}", shorten_query(&record.display_name));
    deliver(&ctx, id.initiator, id.target, record_embed(&id.branch, &record), confirmation).await
}

async fn suggest(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
    let data = ctx.autocomplete_data().ok_or("djs autocomplete invoked without data")?;
    let docs = ctx.require_service::<DocsLibrary>()?;
    let parsed = docs.parse_query(&data.focused.value);

    let choices = match docs.branch(parsed.branch) {
        Some(cache) => {
            let entry = cache.get_cached().await;
            suggestions(parsed.branch, &entry, parsed.query)
        }
        None => Vec::new(),
    };
    ctx.suggest(choices).await?;
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

/// Refreshes `branch` and returns its entry, or `None` if it has never
/// loaded.
async fn load(docs: &DocsLibrary, branch: &str) -> Option<Arc<CacheEntry>> {
    let entry = docs.branch(branch)?.get_index().await;
    entry.is_loaded().then_some(entry)
}

/// Value submitted by a result picker option: `<id>:<display name>`, cut to
/// the option limit.
fn option_value(id: usize, display_name: &str) -> String {
    truncate(&format!("{id}:{display_name}"), OPTION_TEXT_LIMIT)
}

/// Maps a picked option back to its record. The id is trusted only while it
/// still produces the same value; after a refresh the name is looked up
/// instead.
fn resolve_selection(entry: &CacheEntry, value: &str, include_private: bool) -> Option<DocRecord> {
    let (id, name) = value.split_once(':')?;
    let id: usize = id.parse().ok()?;
    entry
        .documents()
        .get(id)
        .filter(|r| option_value(r.id, &r.display_name) == value)
        .or_else(|| entry.find(name))
        .filter(|r| include_private || !r.private)
        .cloned()
}

/// Choices resubmit as `<branch>:<query>`. Each record is offered under its
/// display name, or its locator when the name is too long, and only when
/// that query resolves back to the same record.
fn suggestions(branch: &str, entry: &CacheEntry, query: &str) -> Vec<AutocompleteChoice> {
    let choice = |id: usize| {
        let record = entry.documents().get(id)?;
        let value = [&record.display_name, &record.locator]
            .into_iter()
            .map(|q| (format!("{branch}:{q}"), q))
            .find(|(value, q)| {
                value.chars().count() <= OPTION_TEXT_LIMIT && entry.index().exact(q) == Some(id)
            })
            .map(|(value, _)| value);
        if value.is_none() {
            debug!(branch, name = %record.display_name, "No resolvable autocomplete value");
        }
        Some(AutocompleteChoice::new(&record.display_name, value?))
    };
    match entry.search(query, &SearchOptions::default().include_private(true)) {
        SearchOutcome::Exact(record) => choice(record.id).into_iter().collect(),
        SearchOutcome::Ranked(results) => results.iter().filter_map(|r| choice(r.id)).collect(),
        SearchOutcome::Empty => Vec::new(),
    }
}

fn select_option(result: &SearchResult) -> SelectOption {
    let option = SelectOption::new(truncate(&result.display_name, OPTION_TEXT_LIMIT))
        .value(option_value(result.id, &result.display_name))
        .description(option_description(result.snippet.as_deref()));
    match result.kind.emoji() {
        Some(emoji) => option.emoji(emoji),
        None => option,
    }
}

fn base_embed(branch: &str) -> Embed {
    Embed::new()
        .color(EMBED_COLOR)
        .author(format!("Discord.js Docs ({branch})"), Some(ICON_URL.into()))
        .url(DOCS_URL)
}

/// Detail embed of one record. The source link, when known, is the last
/// field and survives trimming of oversized embeds.
fn record_embed(branch: &str, record: &DocRecord) -> Embed {
    let mut embed = base_embed(branch)
        .title(record.display_name.clone())
        .description(
            record
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "No description provided".into()),
        )
        .field("Kind", record.kind.label(), true);
    if record.private {
        embed = embed.field("Access", "Private", true);
    }
    if let Some(url) = &record.source_url {
        embed = embed.field("Source", format!("[View source]({url})"), false);
    }
    if !embed.within_limits() {
        embed.keep_last_field();
        if let Some(description) = &embed.description {
            embed.description = Some(truncate(description, EMBED_DESCRIPTION_LIMIT));
        }
    }
    embed
}
