//! Documentation source configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings of both documentation sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Web reference documentation (sitemap source).
    #[serde(default)]
    pub mdn: MdnConfig,

    /// Library documentation (versioned snapshot source).
    #[serde(default)]
    pub djs: DjsConfig,
}

/// Sitemap source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdnConfig {
    /// Compressed sitemap listing every page.
    #[serde(default = "default_sitemap_url")]
    pub sitemap_url: String,

    /// Prefix stripped from sitemap locations and prepended to page lookups.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix of links to rendered pages.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Age after which the sitemap is fetched again.
    #[serde(default = "default_mdn_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for MdnConfig {
    fn default() -> Self {
        Self {
            sitemap_url: default_sitemap_url(),
            base_url: default_base_url(),
            site_url: default_site_url(),
            ttl: default_mdn_ttl(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_sitemap_url() -> String {
    "https://developer.mozilla.org/sitemaps/en-us/sitemap.xml.gz".to_string()
}

fn default_base_url() -> String {
    "https://developer.mozilla.org/en-US/docs/".to_string()
}

fn default_site_url() -> String {
    "https://developer.mozilla.org".to_string()
}

fn default_mdn_ttl() -> Duration {
    Duration::from_secs(12 * 60 * 60)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Versioned snapshot source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DjsConfig {
    /// Branch used when a query names none or an unknown one.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Known branches by name.
    #[serde(default = "default_branches")]
    pub branches: BTreeMap<String, BranchConfig>,

    /// Age after which a branch is fetched again. Unset means every command
    /// refetches; autocomplete always uses what is cached.
    #[serde(default, with = "humantime_serde::option")]
    pub ttl: Option<Duration>,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for DjsConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            branches: default_branches(),
            ttl: None,
            request_timeout: default_request_timeout(),
        }
    }
}

/// One documentation branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchConfig {
    /// Location of the branch's JSON snapshot.
    pub url: String,

    /// Repository blob root for "view source" links.
    #[serde(default)]
    pub source_url: Option<String>,
}

fn default_branch() -> String {
    "stable".to_string()
}

fn default_branches() -> BTreeMap<String, BranchConfig> {
    const DOCS: &str = "https://raw.githubusercontent.com/discordjs/docs/main";
    const REPO: &str = "https://github.com/discordjs";

    let branch = |path: &str, repo: &str| BranchConfig {
        url: format!("{DOCS}/{path}.json"),
        source_url: Some(format!("{REPO}/{repo}")),
    };

    BTreeMap::from([
        ("stable".to_string(), branch("discord.js/stable", "discord.js/blob/stable")),
        ("main".to_string(), branch("discord.js/main", "discord.js/blob/main")),
        ("builders".to_string(), branch("builders/main", "builders/blob/main")),
        ("collection".to_string(), branch("collection/main", "collection/blob/main")),
        ("voice".to_string(), branch("voice/main", "voice/blob/main")),
        ("rpc".to_string(), branch("rpc/master", "RPC/blob/master")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DocsConfig::default();
        assert_eq!(config.mdn.ttl, Duration::from_secs(43_200));
        assert_eq!(config.djs.default_branch, "stable");
        assert!(config.djs.branches.contains_key("stable"));
        assert_eq!(config.djs.branches.len(), 6);
        assert!(config.djs.ttl.is_none());
    }

    #[test]
    fn test_humantime_durations() {
        let config: DocsConfig = serde_json::from_str(
            r#"{ "mdn": { "ttl": "6h", "request_timeout": "10s" }, "djs": { "ttl": "15m" } }"#,
        )
        .unwrap();
        assert_eq!(config.mdn.ttl, Duration::from_secs(6 * 3600));
        assert_eq!(config.mdn.request_timeout, Duration::from_secs(10));
        assert_eq!(config.djs.ttl, Some(Duration::from_secs(900)));
        assert_eq!(config.mdn.base_url, default_base_url());
    }

    #[test]
    fn test_custom_branches_replace_defaults() {
        let config: DjsConfig = serde_json::from_str(
            r#"{ "default_branch": "v14", "branches": { "v14": { "url": "https://docs.test/v14.json" } } }"#,
        )
        .unwrap();
        assert_eq!(config.branches.len(), 1);
        assert_eq!(config.branches["v14"].source_url, None);
    }
}
