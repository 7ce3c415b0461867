//! Layered configuration loading.
//!
//! Sources, lowest priority first:
//!
//! 1. [`TomeConfig::default`]
//! 2. `tome.<profile>.toml` (or `config.<profile>.toml`)
//! 3. `tome.toml` (or `config.toml`)
//! 4. `TOME_*` environment variables, `__` separating nested keys
//! 5. Configs passed to [`ConfigLoader::merge`]
//!
//! ```text
//! TOME_BOT__TOKEN=xxx          bot.token = "xxx"
//! TOME_LOGGING__LEVEL=debug    logging.level = "debug"
//! TOME_DOCS__MDN__TTL=6h       docs.mdn.ttl = "6h"
//! ```
//!
//! The profile comes from `TOME_PROFILE` and defaults to `development`.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Serialized};
#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::TomeConfig;

/// Environment variable selecting the profile.
pub const PROFILE_ENV: &str = "TOME_PROFILE";

const ENV_PREFIX: &str = "TOME_";
const ENV_SEPARATOR: &str = "__";
/// File stems tried in every directory, in order.
const FILE_STEMS: [&str; 2] = ["tome", "config"];

/// Deployment profile name, lowercased. `prod` and `dev` are aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile(String);

impl Profile {
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "" | "dev" => Self::default(),
            "prod" => Self("production".into()),
            _ => Self(name),
        }
    }

    /// Reads `TOME_PROFILE`.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV).map(|p| Self::new(&p)).unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self("development".into())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration files picked for one load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFiles {
    pub profile: Option<PathBuf>,
    pub base: Option<PathBuf>,
}

impl ConfigFiles {
    /// Picks the first directory holding a base file, together with its
    /// profile variant. Without any base file, the first profile file found
    /// is used on its own.
    pub fn discover(directories: &[PathBuf], profile: &Profile) -> Self {
        let candidates = || {
            directories
                .iter()
                .flat_map(|dir| FILE_STEMS.iter().map(move |stem| (dir, *stem)))
        };

        for (dir, stem) in candidates() {
            let base = dir.join(format!("{stem}.toml"));
            if base.is_file() {
                let profiled = dir.join(format!("{stem}.{profile}.toml"));
                return Self {
                    profile: profiled.is_file().then_some(profiled),
                    base: Some(base),
                };
            }
        }

        Self {
            profile: candidates()
                .map(|(dir, stem)| dir.join(format!("{stem}.{profile}.toml")))
                .find(|path| path.is_file()),
            base: None,
        }
    }

    fn in_merge_order(&self) -> impl Iterator<Item = &PathBuf> {
        self.profile.iter().chain(self.base.iter())
    }

    fn is_empty(&self) -> bool {
        self.profile.is_none() && self.base.is_none()
    }
}

/// Builds a [`TomeConfig`] from every configured source.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    profile: Profile,
    directories: Vec<PathBuf>,
    file: Option<PathBuf>,
    env: bool,
    overrides: Figment,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Searches the current directory and the user config directory unless
    /// search paths are added.
    pub fn new() -> Self {
        Self {
            profile: Profile::from_env(),
            directories: Vec::new(),
            file: None,
            env: true,
            overrides: Figment::new(),
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::new(&profile.into());
        self
    }

    /// Adds a directory to search for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.directories.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Loads exactly this file instead of searching. A missing file is an
    /// error.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Ignores `TOME_*` environment variables.
    pub fn without_env(mut self) -> Self {
        self.env = false;
        self
    }

    /// Merges a complete configuration over every other source.
    pub fn merge(mut self, config: TomeConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    pub fn load(self) -> ConfigResult<TomeConfig> {
        let config: TomeConfig = self
            .figment()?
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!(
            profile = %self.profile,
            level = %config.logging.level,
            branches = config.docs.djs.branches.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(TomeConfig::default()));

        let files = match &self.file {
            Some(path) if !path.is_file() => return Err(ConfigError::FileNotFound(path.clone())),
            Some(path) => ConfigFiles {
                profile: None,
                base: Some(path.clone()),
            },
            None if cfg!(feature = "toml-config") => {
                ConfigFiles::discover(&self.directories(), &self.profile)
            }
            None => ConfigFiles::default(),
        };
        if files.is_empty() {
            warn!(profile = %self.profile, "No configuration file found, using defaults");
        }
        for path in files.in_merge_order() {
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_file(figment, path)?;
        }

        if self.env {
            figment = figment.merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["PROFILE"])
                    .split(ENV_SEPARATOR),
            );
        }
        Ok(figment.merge(self.overrides.clone()))
    }

    fn directories(&self) -> Vec<PathBuf> {
        if !self.directories.is_empty() {
            return self.directories.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("tome")))
            .collect()
    }
}

#[cfg_attr(not(feature = "toml-config"), allow(unused_variables))]
fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    match path.extension().and_then(|e| e.to_str()) {
        #[cfg(feature = "toml-config")]
        Some("toml") => Ok(figment.merge(Toml::file(path))),
        _ => Err(ConfigError::ParseError(format!(
            "{} is not a supported configuration file",
            path.display()
        ))),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<TomeConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<TomeConfig> {
    ConfigLoader::new().file(path).load()
}
