//! Settings for notemover.
//!
//! The settings are persisted by the host as a camelCase JSON blob. They can
//! also be loaded from a TOML or YAML file, and two of them may be overridden
//! from the environment:
//!
//! | Variable             | Setting   |
//! |----------------------|-----------|
//! | `NOTEMOVER_TRIGGER`  | `trigger` |
//! | `NOTEMOVER_IS_DEBUG` | `isDebug` |

pub mod error;
mod rule;

pub use crate::rule::{Caller, ExcludedFolder, FilterExpression, Rule, SourceFolder, TargetFolder};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "NOTEMOVER_";
/// File name of the settings file inside the configuration directory.
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Which callers are honored: `auto` honors commands and file events,
    /// `cmd` honors commands only.
    pub trigger: Caller,
    pub is_debug: bool,
    /// Evaluated in order; a later matching rule wins.
    pub rules: Vec<Rule>,
    pub excluded_folders: Vec<ExcludedFolder>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Overrides {
    trigger: Option<Caller>,
    is_debug: Option<bool>,
}

impl Settings {
    /// Load settings from `path`, layered over the defaults and under the
    /// environment overrides.
    ///
    /// The format is chosen by extension (`json`, `toml`, `yaml`/`yml`). A
    /// missing file is not an error: the defaults are used instead, as on a
    /// fresh install.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Figment::new().merge(Json::file(path)),
            Some("toml") => Figment::new().merge(Toml::file(path)),
            Some("yaml" | "yml") => Figment::new().merge(Yaml::file(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        };
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        match path.exists() {
            true => figment = figment.merge(file),
            false => tracing::debug!(path = %path.display(), "No settings file, using defaults"),
        }
        let mut settings: Settings = figment.extract().or_raise(|| ErrorKind::Load)?;
        settings.apply_env_overrides()?;
        tracing::debug!(
            path = %path.display(),
            trigger = %settings.trigger,
            rules = settings.rules.len(),
            excluded_folders = settings.excluded_folders.len(),
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Parse the blob the host persists. Missing keys take their defaults;
    /// the environment is not consulted.
    pub fn from_json(json: &str) -> Result<Self> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Json::string(json))
            .extract()
            .or_raise(|| ErrorKind::Load)
    }

    /// Where the settings file lives by default, under the platform's
    /// configuration directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "notemover").ok_or_raise(|| ErrorKind::NoConfigDir)?;
        Ok(dirs.config_dir().join(SETTINGS_FILE))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        let overrides: Overrides = Figment::from(Env::prefixed(ENV_PREFIX).only(&["trigger", "is_debug"]))
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        if let Some(trigger) = overrides.trigger {
            self.trigger = trigger;
        }
        if let Some(is_debug) = overrides.is_debug {
            self.is_debug = is_debug;
        }
        Ok(())
    }

    /// Flip between honoring file events (`auto`) and commands only (`cmd`).
    /// Returns the new mode.
    pub fn toggle_trigger(&mut self) -> Caller {
        self.trigger = match self.trigger {
            Caller::Auto => Caller::Cmd,
            Caller::Cmd => Caller::Auto,
        };
        self.trigger
    }

    /// Swap two rules. Out-of-range indices leave the rules untouched and
    /// return `false`.
    pub fn swap_rules(&mut self, a: usize, b: usize) -> bool {
        swap(&mut self.rules, a, b)
    }

    /// Swap two excluded folders. Out-of-range indices leave the list
    /// untouched and return `false`.
    pub fn swap_excluded_folders(&mut self, a: usize, b: usize) -> bool {
        swap(&mut self.excluded_folders, a, b)
    }

    /// The most verbose log level the settings ask for.
    pub fn max_level(&self) -> tracing::Level {
        match self.is_debug {
            true => tracing::Level::DEBUG,
            false => tracing::Level::INFO,
        }
    }
}

fn swap<T>(items: &mut [T], a: usize, b: usize) -> bool {
    if a >= items.len() || b >= items.len() {
        return false;
    }
    items.swap(a, b);
    true
}
