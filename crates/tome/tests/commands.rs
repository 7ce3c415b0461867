//! End-to-end tests of the lookup commands, driven through the runtime with
//! in-memory documentation sources.

use std::sync::Arc;

use async_trait::async_trait;
use tome::TomeBot;
use tome::core::{
    AutocompleteData, BoxedResponder, ChannelId, CommandData, CommandOption, Component,
    ComponentData, Defer, FocusedOption, Interaction, InteractionData, InteractionId, Recorded,
    RecordingResponder, Reply, User,
};
use tome::docs::{
    DocKind, DocRecord, DocsLibrary, DocumentSource, ExactKey, FetchError, FetchResult,
    PageFetcher, PageSummary, SearchCache, parse_docs,
};
use tome::runtime::{InboundEvent, TomeConfig, TomeRuntime};

const DJS_DOCS: &str = r#"{
    "classes": [
        {
            "name": "Client",
            "description": "The main hub for interacting with the Discord API.",
            "meta": { "line": 21, "file": "Client.js", "path": "src/client" },
            "props": [
                { "name": "user", "description": "User that the client is logged in as" },
                { "name": "_intents", "access": "private" },
                { "name": "ready", "description": "Whether the client is ready." }
            ],
            "methods": [ { "name": "login", "description": "Logs the client in." } ],
            "events": [ { "name": "ready", "description": "Emitted when the client becomes ready." } ]
        },
        { "name": "ClientUser", "description": "Represents the logged in client's Discord user." },
        {
            "name": "GuildMember",
            "description": "Represents a member of a guild on Discord.",
            "props": [ { "name": "user", "description": "The user that this guild member instance represents" } ]
        },
        { "name": "WebhookClient", "description": "The webhook client." }
    ]
}"#;

const BLOB: &str = "https://github.com/discordjs/discord.js/blob/main/packages/discord.js";

const MDN_PAGES: [&str; 4] = [
    "Web/API/fetch",
    "Web/API/Fetch_API",
    "Web/API/Fetch_API/Using_Fetch",
    "Web/JavaScript/Reference/Global_Objects/Array/filter",
];

// =============================================================================
// Fixtures
// =============================================================================

struct DjsSource;

#[async_trait]
impl DocumentSource for DjsSource {
    fn name(&self) -> &str {
        "djs"
    }

    fn exact_key(&self) -> ExactKey {
        ExactKey::Identifier
    }

    async fn fetch(&self) -> FetchResult<Vec<DocRecord>> {
        parse_docs(DJS_DOCS.as_bytes(), Some(BLOB))
    }
}

struct BrokenSource;

#[async_trait]
impl DocumentSource for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    fn exact_key(&self) -> ExactKey {
        ExactKey::Identifier
    }

    async fn fetch(&self) -> FetchResult<Vec<DocRecord>> {
        Err(FetchError::Status {
            url: "https://docs.test/broken.json".into(),
            status: 503,
        })
    }
}

struct SitemapFixture;

#[async_trait]
impl DocumentSource for SitemapFixture {
    fn name(&self) -> &str {
        "mdn"
    }

    fn exact_key(&self) -> ExactKey {
        ExactKey::Locator
    }

    async fn fetch(&self) -> FetchResult<Vec<DocRecord>> {
        Ok(MDN_PAGES
            .iter()
            .enumerate()
            .map(|(i, path)| DocRecord::new(i, *path, DocKind::Page))
            .collect())
    }
}

/// Serves a summary for every page except `Using_Fetch`.
struct PageFixture;

#[async_trait]
impl PageFetcher for PageFixture {
    async fn fetch_page(&self, locator: &str) -> FetchResult<PageSummary> {
        if locator.ends_with("Using_Fetch") {
            return Err(FetchError::Status {
                url: format!("https://mdn.test/{locator}/index.json"),
                status: 404,
            });
        }
        let title = locator.rsplit('/').next().unwrap_or(locator).to_string();
        Ok(PageSummary {
            title,
            url: format!("https://developer.mozilla.org/en-US/docs/{locator}"),
            summary: format!("Summary of {locator}"),
        })
    }
}

fn runtime() -> TomeRuntime {
    let docs = DocsLibrary::new(
        Arc::new(SearchCache::new(Arc::new(SitemapFixture), None)),
        Arc::new(PageFixture),
        "stable",
    )
    .with_branch("stable", Arc::new(SearchCache::new(Arc::new(DjsSource), None)))
    .with_branch("broken", Arc::new(SearchCache::new(Arc::new(BrokenSource), None)));

    TomeBot::builder()
        .config(TomeConfig::default())
        .without_logging()
        .docs(Arc::new(docs))
        .build()
        .unwrap()
}

fn interaction(user: u64, data: InteractionData) -> InboundEvent {
    Interaction {
        id: InteractionId(1),
        token: "tok".into(),
        user: User::new(user, "alice"),
        channel_id: Some(ChannelId(20)),
        guild: None,
        data,
    }
    .into()
}

fn command(name: &str, options: Vec<CommandOption>) -> InboundEvent {
    interaction(
        7,
        InteractionData::Command(CommandData {
            name: name.into(),
            options,
        }),
    )
}

fn select(custom_id: &str, value: &str) -> InboundEvent {
    interaction(
        7,
        InteractionData::SelectMenu(ComponentData {
            custom_id: custom_id.into(),
            values: vec![value.into()],
            message_id: None,
        }),
    )
}

fn autocomplete(command: &str, value: &str) -> InboundEvent {
    interaction(
        7,
        InteractionData::Autocomplete(AutocompleteData {
            command_name: command.into(),
            focused: FocusedOption {
                name: "query".into(),
                value: value.into(),
            },
            options: vec![],
        }),
    )
}

async fn run(runtime: &TomeRuntime, event: InboundEvent) -> Arc<RecordingResponder> {
    let responder = Arc::new(RecordingResponder::new());
    runtime.handle(event, responder.clone() as BoxedResponder).await;
    responder
}

fn last_edit(responder: &RecordingResponder) -> Reply {
    match responder.last() {
        Some(Recorded::EditReply(reply)) => reply,
        other => panic!("expected an edited reply, got {other:?}"),
    }
}

fn posted(responder: &RecordingResponder) -> Vec<(ChannelId, Reply)> {
    responder
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Recorded::SendMessage(channel, reply) => Some((channel, reply)),
            _ => None,
        })
        .collect()
}

fn menu(reply: &Reply) -> (String, Vec<String>) {
    match reply.components.first() {
        Some(Component::SelectMenu { custom_id, options, .. }) => (
            custom_id.clone(),
            options.iter().map(|o| o.value.clone()).collect(),
        ),
        other => panic!("expected a select menu, got {other:?}"),
    }
}

// =============================================================================
// /djs
// =============================================================================

#[tokio::test]
async fn test_djs_exact_match_posts_embed() {
    let runtime = runtime();
    let responder = run(&runtime, command("djs", vec![CommandOption::string("query", "Client")])).await;

    assert_eq!(responder.calls()[0], Recorded::Defer(Defer::Ephemeral));

    let posted = posted(&responder);
    assert_eq!(posted.len(), 1);
    let (channel, message) = &posted[0];
    assert_eq!(*channel, ChannelId(20));
    assert_eq!(message.content.as_deref(), Some("Sent by <@7>"));
    let embed = &message.embeds[0];
    assert_eq!(embed.title.as_deref(), Some("Client"));
    assert_eq!(
        embed.fields.last().map(|f| f.value.as_str()),
        Some(format!("[View source]({BLOB}/src/client/Client.js#L21)").as_str())
    );

    let confirmation = last_edit(&responder);
    assert_eq!(confirmation.content.as_deref(), Some("Sent documentations for Client"));
    assert!(matches!(
        confirmation.components.first(),
        Some(Component::Button { custom_id, .. }) if custom_id == "deletebtn/v1/7/1000"
    ));
}

#[tokio::test]
async fn test_djs_mentions_target() {
    let runtime = runtime();
    let responder = run(
        &runtime,
        command(
            "djs",
            vec![
                CommandOption::string("query", "client.login"),
                CommandOption::user("target", 9u64),
            ],
        ),
    )
    .await;

    let posted = posted(&responder);
    assert_eq!(posted[0].1.content.as_deref(), Some("Sent by <@7> for <@9>"));
    assert_eq!(posted[0].1.embeds[0].title.as_deref(), Some("Client#login()"));
}

#[tokio::test]
async fn test_djs_several_matches_offer_menu_then_deliver_choice() {
    let runtime = runtime();
    let responder = run(&runtime, command("djs", vec![CommandOption::string("query", "user")])).await;

    let prompt = last_edit(&responder);
    assert_eq!(
        prompt.content.as_deref(),
        Some("Didn't find an exact match, please select one from below")
    );
    let (custom_id, values) = menu(&prompt);
    assert_eq!(custom_id, "djsselect/v2/stable/false/7/");
    assert_eq!(values, vec!["6:ClientUser", "1:Client#user", "8:GuildMember#user"]);
    assert!(posted(&responder).is_empty());

    let responder = run(&runtime, select(&custom_id, "8:GuildMember#user")).await;
    assert_eq!(responder.calls()[0], Recorded::Defer(Defer::Update));
    let posted = posted(&responder);
    assert_eq!(posted[0].1.embeds[0].title.as_deref(), Some("GuildMember#user"));
    assert_eq!(
        last_edit(&responder).content.as_deref(),
        Some("Sent documentations for GuildMember#user")
    );
}

#[tokio::test]
async fn test_djs_no_results() {
    let runtime = runtime();
    let responder = run(
        &runtime,
        command("djs", vec![CommandOption::string("query", "xyzzy")]),
    )
    .await;

    let reply = last_edit(&responder);
    assert_eq!(
        reply.embeds[0].description.as_deref(),
        Some("Didn't find any results for that query")
    );
    assert!(posted(&responder).is_empty());
}

#[tokio::test]
async fn test_djs_private_members_are_opt_in() {
    let runtime = runtime();
    let hidden = run(
        &runtime,
        command("djs", vec![CommandOption::string("query", "intents")]),
    )
    .await;
    assert!(last_edit(&hidden).embeds[0].description.is_some());

    let shown = run(
        &runtime,
        command(
            "djs",
            vec![
                CommandOption::string("query", "intents"),
                CommandOption::boolean("private", true),
            ],
        ),
    )
    .await;
    let (custom_id, values) = menu(&last_edit(&shown));
    assert_eq!(custom_id, "djsselect/v2/stable/true/7/");
    assert_eq!(values, vec!["2:Client#_intents"]);

    let picked = run(&runtime, select("djsselect/v2/stable/false/7/", "2:Client#_intents")).await;
    assert!(posted(&picked).is_empty());
}

#[tokio::test]
async fn test_djs_event_and_property_sharing_a_name() {
    let runtime = runtime();
    let event = run(
        &runtime,
        command("djs", vec![CommandOption::string("query", "Client#event:ready")]),
    )
    .await;
    let embed = &posted(&event)[0].1.embeds[0];
    assert_eq!(embed.title.as_deref(), Some("Client#event:ready"));
    assert_eq!(
        embed.description.as_deref(),
        Some("Emitted when the client becomes ready.")
    );

    let property = run(
        &runtime,
        command("djs", vec![CommandOption::string("query", "client.ready")]),
    )
    .await;
    assert_eq!(
        posted(&property)[0].1.embeds[0].title.as_deref(),
        Some("Client#ready")
    );
}

#[tokio::test]
async fn test_djs_menu_picks_event_over_same_named_property() {
    let runtime = runtime();
    let responder = run(&runtime, command("djs", vec![CommandOption::string("query", "ready")])).await;
    let (custom_id, values) = menu(&last_edit(&responder));
    assert_eq!(values, vec!["3:Client#ready", "5:Client#event:ready"]);

    let responder = run(&runtime, select(&custom_id, &values[1])).await;
    assert_eq!(
        posted(&responder)[0].1.embeds[0].title.as_deref(),
        Some("Client#event:ready")
    );
    assert_eq!(
        last_edit(&responder).content.as_deref(),
        Some("Sent documentations for Client#event:ready")
    );
}

#[tokio::test]
async fn test_djs_unavailable_source() {
    let runtime = runtime();
    let prefixed = run(
        &runtime,
        command("djs", vec![CommandOption::string("query", "broken:Client")]),
    )
    .await;
    assert_eq!(prefixed.last_text().as_deref(), Some("Couldn't fetch docs"));

    let by_option = run(
        &runtime,
        command(
            "djs",
            vec![
                CommandOption::string("query", "Client"),
                CommandOption::string("source", "broken"),
            ],
        ),
    )
    .await;
    assert_eq!(by_option.last_text().as_deref(), Some("Couldn't fetch docs"));
}

#[tokio::test]
async fn test_djs_failed_post_is_reported() {
    let runtime = runtime();
    let responder = Arc::new(RecordingResponder::new().failing_sends());
    runtime
        .handle(
            command("djs", vec![CommandOption::string("query", "Client")]),
            responder.clone() as BoxedResponder,
        )
        .await;

    assert_eq!(
        responder.last_text().as_deref(),
        Some("There was an error trying to send the message")
    );
}

#[tokio::test]
async fn test_djs_autocomplete_prefixes_branch() {
    let runtime = runtime();
    let responder = run(&runtime, autocomplete("djs", "user")).await;

    let Some(Recorded::Autocomplete(choices)) = responder.last() else {
        panic!("expected autocomplete choices");
    };
    let values: Vec<_> = choices.iter().map(|c| c.value.as_str()).collect();
    assert_eq!(
        values,
        vec!["stable:ClientUser", "stable:Client#user", "stable:GuildMember#user"]
    );

    // Private members are offered while typing.
    let responder = run(&runtime, autocomplete("djs", "intents")).await;
    let Some(Recorded::Autocomplete(choices)) = responder.last() else {
        panic!("expected autocomplete choices");
    };
    assert_eq!(choices[0].name, "Client#_intents");
}

#[tokio::test]
async fn test_djs_autocomplete_value_resubmits_to_same_record() {
    let runtime = runtime();
    let responder = run(&runtime, autocomplete("djs", "Client#event:ready")).await;
    let Some(Recorded::Autocomplete(choices)) = responder.last() else {
        panic!("expected autocomplete choices");
    };
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].value, "stable:Client#event:ready");

    let responder = run(
        &runtime,
        command("djs", vec![CommandOption::string("query", &choices[0].value)]),
    )
    .await;
    assert_eq!(
        posted(&responder)[0].1.embeds[0].title.as_deref(),
        Some("Client#event:ready")
    );
}

// =============================================================================
// /mdn
// =============================================================================

#[tokio::test]
async fn test_mdn_exact_locator() {
    let runtime = runtime();
    let responder = run(
        &runtime,
        command("mdn", vec![CommandOption::string("query", "Web/API/fetch")]),
    )
    .await;

    let posted = posted(&responder);
    let embed = &posted[0].1.embeds[0];
    assert_eq!(embed.title.as_deref(), Some("fetch"));
    assert_eq!(
        embed.url.as_deref(),
        Some("https://developer.mozilla.org/en-US/docs/Web/API/fetch")
    );
    assert_eq!(
        last_edit(&responder).content.as_deref(),
        Some("Sent documentation for Web/API/fetch")
    );
}

#[tokio::test]
async fn test_mdn_single_candidate_counts_as_exact() {
    let runtime = runtime();
    let responder = run(
        &runtime,
        command("mdn", vec![CommandOption::string("query", "filter")]),
    )
    .await;

    let posted = posted(&responder);
    assert_eq!(posted[0].1.embeds[0].title.as_deref(), Some("filter"));
}

#[tokio::test]
async fn test_mdn_several_matches_offer_menu() {
    let runtime = runtime();
    let responder = run(
        &runtime,
        command("mdn", vec![CommandOption::string("query", "fetch")]),
    )
    .await;

    let (custom_id, values) = menu(&last_edit(&responder));
    assert_eq!(custom_id, "mdnselect/v1/7/");
    assert_eq!(
        values,
        vec!["Web/API/fetch", "Web/API/Fetch_API", "Web/API/Fetch_API/Using_Fetch"]
    );

    let responder = run(&runtime, select(&custom_id, "Web/API/Fetch_API")).await;
    let posted = posted(&responder);
    assert_eq!(posted[0].1.embeds[0].title.as_deref(), Some("Fetch_API"));
    assert_eq!(
        last_edit(&responder).content.as_deref(),
        Some("Sent documentations for Web/API/Fetch_API")
    );
}

#[tokio::test]
async fn test_mdn_page_failure() {
    let runtime = runtime();
    let responder = run(&runtime, select("mdnselect/v1/7/", "Web/API/Fetch_API/Using_Fetch")).await;

    assert_eq!(responder.last_text().as_deref(), Some("Couldn't find any results"));
    assert!(posted(&responder).is_empty());
}

#[tokio::test]
async fn test_mdn_no_results() {
    let runtime = runtime();
    let responder = run(
        &runtime,
        command("mdn", vec![CommandOption::string("query", "xyzzy")]),
    )
    .await;

    let embed = &last_edit(&responder).embeds[0];
    assert_eq!(embed.title.as_deref(), Some("Search for: xyzzy"));
    assert_eq!(embed.description.as_deref(), Some("No results found..."));
}
