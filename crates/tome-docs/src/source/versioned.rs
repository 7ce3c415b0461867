//! Versioned documentation snapshot source.
//!
//! Reads the JSON documentation a library generates per release branch
//! (classes, interfaces and typedefs with their properties, methods and
//! events) and flattens it into records named the way users type them:
//! `Client`, `Client#user`, `Client#login()`, `Client#event:ready`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use tracing::debug;

use super::DocumentSource;
use crate::error::{FetchError, FetchResult};
use crate::index::ExactKey;
use crate::record::{DocKind, DocRecord};

#[derive(Debug, Default, Deserialize)]
struct DocsFile {
    #[serde(default)]
    classes: Vec<Parent>,
    #[serde(default)]
    interfaces: Vec<Parent>,
    #[serde(default)]
    typedefs: Vec<Parent>,
}

#[derive(Debug, Deserialize)]
struct Parent {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    props: Vec<Member>,
    #[serde(default)]
    methods: Vec<Member>,
    #[serde(default)]
    events: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Member {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Clone, Deserialize)]
struct Meta {
    line: u64,
    file: String,
    path: String,
}

/// One release branch of a versioned documentation set.
#[derive(Debug, Clone)]
pub struct VersionedDocsSource {
    branch: String,
    client: Client,
    url: String,
    source_url: Option<String>,
}

impl VersionedDocsSource {
    /// Creates a source reading the branch's JSON from `url`.
    ///
    /// `source_url` is the repository blob root used to link records to code.
    pub fn new(
        branch: impl Into<String>,
        url: impl Into<String>,
        source_url: Option<String>,
        timeout: Duration,
    ) -> FetchResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            branch: branch.into(),
            client,
            url: url.into(),
            source_url,
        })
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }
}

#[async_trait]
impl DocumentSource for VersionedDocsSource {
    fn name(&self) -> &str {
        &self.branch
    }

    fn exact_key(&self) -> ExactKey {
        ExactKey::Identifier
    }

    async fn fetch(&self) -> FetchResult<Vec<DocRecord>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::transport(&self.url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::transport(&self.url, e))?;
        debug!(branch = %self.branch, bytes = body.len(), "Downloaded documentation snapshot");
        parse_docs(&body, self.source_url.as_deref())
    }
}

/// Flattens a documentation snapshot into records.
///
/// Each parent is followed by its properties, methods and events.
pub fn parse_docs(json: &[u8], source_url: Option<&str>) -> FetchResult<Vec<DocRecord>> {
    let file: DocsFile = serde_json::from_slice(json)?;
    let mut records = Vec::new();

    let groups = [
        (file.classes, DocKind::Class),
        (file.interfaces, DocKind::Interface),
        (file.typedefs, DocKind::Typedef),
    ];
    for (parents, kind) in groups {
        for parent in parents {
            push(
                &mut records,
                parent.name.clone(),
                parent.name.clone(),
                kind,
                parent.description.as_deref(),
                parent.access.as_deref(),
                parent.meta.as_ref(),
                source_url,
            );
            let members = [
                (&parent.props, DocKind::Property),
                (&parent.methods, DocKind::Method),
                (&parent.events, DocKind::Event),
            ];
            for (list, member_kind) in members {
                for member in list {
                    let locator = format!("{}#{}", parent.name, member.name);
                    let display = match member_kind {
                        DocKind::Method => format!("{locator}()"),
                        DocKind::Event => format!("{}#event:{}", parent.name, member.name),
                        _ => locator.clone(),
                    };
                    push(
                        &mut records,
                        locator,
                        display,
                        member_kind,
                        member.description.as_deref(),
                        member.access.as_deref().or(parent.access.as_deref()),
                        member.meta.as_ref().or(parent.meta.as_ref()),
                        source_url,
                    );
                }
            }
        }
    }
    Ok(records)
}

#[allow(clippy::too_many_arguments)]
fn push(
    records: &mut Vec<DocRecord>,
    locator: String,
    display_name: String,
    kind: DocKind,
    description: Option<&str>,
    access: Option<&str>,
    meta: Option<&Meta>,
    source_url: Option<&str>,
) {
    let mut record = DocRecord::new(records.len(), display_name, kind).private(access == Some("private"));
    record.locator = locator;
    record.description = description
        .map(clean_description)
        .filter(|d| !d.is_empty());
    record.source_url = source_url
        .zip(meta)
        .map(|(root, m)| format!("{}/{}/{}#L{}", root.trim_end_matches('/'), m.path, m.file, m.line));
    records.push(record);
}

/// Replaces `{@link Target}` and `{@link Target|text}` markers with their text.
fn clean_description(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text.trim();
    while let Some(start) = rest.find("{@link ") {
        out.push_str(&rest[..start]);
        let after = &rest[start + "{@link ".len()..];
        match after.find('}') {
            Some(end) => {
                let link = &after[..end];
                out.push_str(link.rsplit('|').next().unwrap_or(link).trim());
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "meta": { "generator": "0.8.1", "format": 20 },
        "classes": [
            {
                "name": "Client",
                "description": "The main hub for interacting with the {@link https://discord.com/developers|Discord API}.",
                "meta": { "line": 21, "file": "Client.js", "path": "src/client" },
                "props": [
                    { "name": "user", "description": "User that the client is logged in as" },
                    { "name": "_intents", "access": "private" }
                ],
                "methods": [
                    {
                        "name": "login",
                        "description": "Logs the client in.",
                        "meta": { "line": 210, "file": "Client.js", "path": "src/client" }
                    }
                ],
                "events": [ { "name": "ready", "description": "Emitted when the client becomes ready." } ]
            }
        ],
        "typedefs": [ { "name": "Snowflake", "description": "A Twitter snowflake" } ]
    }"#;

    const BLOB: &str = "https://github.com/discordjs/discord.js/blob/main/packages/discord.js";

    #[test]
    fn test_flattened_names() {
        let records = parse_docs(SNAPSHOT.as_bytes(), Some(BLOB)).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Client",
                "Client#user",
                "Client#_intents",
                "Client#login()",
                "Client#event:ready",
                "Snowflake",
            ]
        );
        assert!(records.iter().enumerate().all(|(i, r)| r.id == i));
        assert_eq!(records[3].locator, "Client#login");
        assert_eq!(records[4].kind, DocKind::Event);
        assert_eq!(records[5].kind, DocKind::Typedef);
    }

    #[test]
    fn test_private_and_descriptions() {
        let records = parse_docs(SNAPSHOT.as_bytes(), None).unwrap();
        assert!(records[2].private);
        assert!(!records[1].private);
        assert_eq!(
            records[0].description.as_deref(),
            Some("The main hub for interacting with the Discord API.")
        );
        assert!(records[2].description.is_none());
        assert!(records.iter().all(|r| r.source_url.is_none()));
    }

    #[test]
    fn test_source_links_fall_back_to_parent() {
        let records = parse_docs(SNAPSHOT.as_bytes(), Some(BLOB)).unwrap();
        assert_eq!(
            records[3].source_url.as_deref(),
            Some(format!("{BLOB}/src/client/Client.js#L210").as_str())
        );
        assert_eq!(
            records[1].source_url.as_deref(),
            Some(format!("{BLOB}/src/client/Client.js#L21").as_str())
        );
        assert!(records[5].source_url.is_none());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_docs(b"not json", None), Err(FetchError::Json(_))));
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stable.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SNAPSHOT)
            .create_async()
            .await;
        let source = VersionedDocsSource::new(
            "stable",
            format!("{}/stable.json", server.url()),
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(source.name(), "stable");
        assert_eq!(source.fetch().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_fetch_missing_branch() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/gone.json").with_status(404).create_async().await;
        let source = VersionedDocsSource::new(
            "gone",
            format!("{}/gone.json", server.url()),
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(matches!(
            source.fetch().await,
            Err(FetchError::Status { status: 404, .. })
        ));
    }
}
