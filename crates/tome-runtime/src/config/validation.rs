//! Configuration validation utilities.

use std::time::Duration;

use tome_docs::{DjsConfig, MdnConfig};

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, TomeConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &TomeConfig) -> ConfigResult<()> {
    if config.bot.name.trim().is_empty() {
        return Err(ConfigError::missing_field("bot.name"));
    }
    if config.dispatch.max_concurrent_events == 0 {
        return Err(ConfigError::validation(
            "dispatch.max_concurrent_events must be greater than 0",
        ));
    }
    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    validate_mdn(&config.docs.mdn)?;
    validate_djs(&config.docs.djs)?;
    Ok(())
}

fn validate_mdn(mdn: &MdnConfig) -> ConfigResult<()> {
    validate_url(&mdn.sitemap_url, "docs.mdn.sitemap_url")?;
    validate_url(&mdn.base_url, "docs.mdn.base_url")?;
    validate_url(&mdn.site_url, "docs.mdn.site_url")?;
    validate_timeout(mdn.request_timeout, "docs.mdn.request_timeout")?;
    if mdn.ttl.is_zero() {
        return Err(ConfigError::validation("docs.mdn.ttl must be greater than 0"));
    }
    Ok(())
}

fn validate_djs(djs: &DjsConfig) -> ConfigResult<()> {
    if !djs.branches.contains_key(&djs.default_branch) {
        return Err(ConfigError::UnknownBranch {
            branch: djs.default_branch.clone(),
        });
    }
    for (name, branch) in &djs.branches {
        if name.is_empty() || name.contains(['/', ':']) {
            return Err(ConfigError::InvalidBranchName(name.clone()));
        }
        validate_url(&branch.url, &format!("docs.djs.branches.{name}.url"))?;
        if let Some(source_url) = &branch.source_url {
            validate_url(source_url, &format!("docs.djs.branches.{name}.source_url"))?;
        }
    }
    validate_timeout(djs.request_timeout, "docs.djs.request_timeout")
}

fn validate_url(url: &str, field: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field(field));
    }
    if !["http://", "https://"].iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            url: url.to_string(),
        });
    }
    Ok(())
}

fn validate_timeout(timeout: Duration, field: &str) -> ConfigResult<()> {
    if timeout.is_zero() {
        return Err(ConfigError::validation(format!("{field} must be greater than 0")));
    }
    Ok(())
}
