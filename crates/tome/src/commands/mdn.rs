//! `/mdn`: MDN web documentation lookup.
//!
//! The sitemap index is cached for the configured TTL; page details are
//! fetched on demand once a single page is chosen.

use std::sync::Arc;

use tome_core::custom_id::{CorrelationRecord, parse_field, parse_optional_field};
use tome_core::{
    AutocompleteChoice, Component, CustomIdResult, Embed, Permission, Permissions, Reply,
    SelectOption, UserId, truncate,
};
use tome_docs::{CacheEntry, DocsLibrary, PageSummary, SearchOptions, SearchOutcome};
use tome_framework::{BoxError, CommandModule, HandlerDescriptor, InteractionContext, ModuleDescriptor};
use tracing::warn;

use super::{SELECT_PLACEHOLDER, SELECT_PROMPT, deliver};
use crate::present::{locator_label, shorten_query};

/// Command name.
pub const COMMAND: &str = "mdn";
/// Handler key of the result picker.
pub const SELECT_KEY: &str = "mdnselect";

pub const MODULE: ModuleDescriptor = ModuleDescriptor::new(COMMAND, build);

const AUTHOR: &str = "MDN Documentation";
const ICON_URL: &str = "https://i.imgur.com/1P4wotC.png";
const SEARCH_COLOR: u32 = 0x83bfff;
const NO_RESULTS_COLOR: u32 = 0xff0000;
const PAGE_COLOR: u32 = 0xffffff;
const TITLE_QUERY_LIMIT: usize = 243;
const SUMMARY_LIMIT: usize = 4096;

const NO_RESULTS: &str = "No results found...";
const PAGE_UNAVAILABLE: &str = "Couldn't find any results";

fn build() -> Result<CommandModule, BoxError> {
    Ok(CommandModule::new()
        .command(
            HandlerDescriptor::command(COMMAND, run)
                .bot_permissions(Permissions::from([Permission::SendMessages, Permission::EmbedLinks])),
        )
        .select_menu(HandlerDescriptor::select_menu(SELECT_KEY, on_select))
        .autocomplete(HandlerDescriptor::autocomplete(COMMAND, "query", suggest)))
}

/// State carried by the result picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MdnSelectId {
    pub initiator: UserId,
    pub target: Option<UserId>,
}

impl CorrelationRecord for MdnSelectId {
    const KEY: &'static str = SELECT_KEY;
    const VERSION: u32 = 1;
    const FIELD_COUNT: usize = 2;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.initiator.to_string(),
            self.target.map(|t| t.to_string()).unwrap_or_default(),
        ]
    }

    fn from_fields(fields: &[String]) -> CustomIdResult<Self> {
        Ok(Self {
            initiator: parse_field::<Self, _>(fields, 0)?,
            target: parse_optional_field::<Self, _>(fields, 1)?,
        })
    }
}

async fn run(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
    let command = ctx.command().ok_or("mdn invoked without command data")?;
    let docs = ctx.require_service::<DocsLibrary>()?;
    let query = command.string("query").unwrap_or_default();
    let target = command.user("target");

    // One candidate counts as an exact match.
    let locator = match docs.mdn().search(query, &SearchOptions::default()).await {
        SearchOutcome::Exact(record) => record.locator,
        SearchOutcome::Ranked(results) if results.len() == 1 => results[0].locator.clone(),
        SearchOutcome::Ranked(results) => {
            let id = MdnSelectId {
                initiator: ctx.user().id,
                target,
            };
            let menu = Component::SelectMenu {
                custom_id: id.encode()?,
                placeholder: Some(SELECT_PLACEHOLDER.into()),
                options: results.iter().map(|r| SelectOption::new(locator_label(&r.locator))).collect(),
            };
            ctx.respond(Reply::text(SELECT_PROMPT).component(menu)).await?;
            return Ok(());
        }
        SearchOutcome::Empty => {
            let embed = search_embed(query).color(NO_RESULTS_COLOR).description(NO_RESULTS);
            ctx.respond(Reply::with_embed(embed)).await?;
            return Ok(());
        }
    };

    let Some(page) = fetch_page(&docs, &locator).await else {
        ctx.respond(Reply::text(PAGE_UNAVAILABLE)).await?;
        return Ok(());
    };
    let confirmation = format!("Sent documentation for {}", shorten_query(query));
    deliver(&ctx, ctx.user().id, target, page_embed(&page), confirmation).await
}

async fn on_select(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
    let component = ctx.component().ok_or("mdn select invoked without component data")?;
    let id = MdnSelectId::decode(&component.custom_id)?;
    let selected = component.values.first().ok_or("mdn select submitted without a value")?;
    let docs = ctx.require_service::<DocsLibrary>()?;

    // Labels of long locators are shortened, so search again and prefer an
    // exact locator over the best candidate.
    let locator = match docs.mdn().search(selected, &SearchOptions::default()).await {
        SearchOutcome::Exact(record) => Some(record.locator),
        SearchOutcome::Ranked(results) => results.into_iter().next().map(|r| r.locator),
        SearchOutcome::Empty => None,
    };
    let page = match locator {
        Some(locator) => fetch_page(&docs, &locator).await,
        None => None,
    };
    let Some(page) = page else {
        ctx.respond(Reply::text(PAGE_UNAVAILABLE)).await?;
        return Ok(());
    };

    let confirmation = format!("Sent documentations for {selected}");
    deliver(&ctx, id.initiator, id.target, page_embed(&page), confirmation).await
}

async fn suggest(ctx: Arc<InteractionContext>) -> Result<(), BoxError> {
    let data = ctx.autocomplete_data().ok_or("mdn autocomplete invoked without data")?;
    let docs = ctx.require_service::<DocsLibrary>()?;
    let entry = docs.mdn().get_index().await;
    ctx.suggest(suggestions(&entry, &data.focused.value)).await?;
    Ok(())
}

fn suggestions(entry: &CacheEntry, query: &str) -> Vec<AutocompleteChoice> {
    let choice = |locator: &str| {
        let label = locator_label(locator);
        AutocompleteChoice::new(&label, &label)
    };
    match entry.search(query, &SearchOptions::default()) {
        SearchOutcome::Exact(record) => vec![choice(&record.locator)],
        SearchOutcome::Ranked(results) => results.iter().map(|r| choice(&r.locator)).collect(),
        SearchOutcome::Empty => Vec::new(),
    }
}

async fn fetch_page(docs: &DocsLibrary, locator: &str) -> Option<PageSummary> {
    match docs.pages().fetch_page(locator).await {
        Ok(page) => Some(page),
        Err(e) => {
            warn!(locator, error = %e, "Failed to fetch page");
            None
        }
    }
}

fn search_embed(query: &str) -> Embed {
    let shown: String = query.chars().take(TITLE_QUERY_LIMIT).collect();
    Embed::new()
        .color(SEARCH_COLOR)
        .author(AUTHOR, Some(ICON_URL.into()))
        .title(format!("Search for: {shown}"))
}

fn page_embed(page: &PageSummary) -> Embed {
    Embed::new()
        .color(PAGE_COLOR)
        .author(AUTHOR, Some(ICON_URL.into()))
        .title(page.title.clone())
        .url(page.url.clone())
        .thumbnail(ICON_URL)
        .description(truncate(&page.summary, SUMMARY_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_id_layout() {
        let with_target = MdnSelectId {
            initiator: UserId(7),
            target: Some(UserId(9)),
        };
        assert_eq!(with_target.encode().unwrap(), "mdnselect/v1/7/9");

        let alone = MdnSelectId {
            initiator: UserId(7),
            target: None,
        };
        assert_eq!(MdnSelectId::decode(&alone.encode().unwrap()).unwrap(), alone);
    }

    #[test]
    fn test_search_embed_title_is_bounded() {
        let embed = search_embed(&"q".repeat(300));
        assert_eq!(embed.title.map(|t| t.chars().count()), Some(12 + TITLE_QUERY_LIMIT));
    }

    #[test]
    fn test_page_embed() {
        let embed = page_embed(&PageSummary {
            title: "Array.prototype.filter()".into(),
            url: "https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Array/filter".into(),
            summary: "Creates a shallow copy".into(),
        });
        assert_eq!(embed.color, Some(PAGE_COLOR));
        assert_eq!(embed.thumbnail.as_deref(), Some(ICON_URL));
        assert_eq!(embed.description.as_deref(), Some("Creates a shallow copy"));
    }
}
