//! User configuration loaded from `~/.config/aether-launcher/config.json`.
//!
//! Every key is optional. A file that cannot be parsed is reported and
//! ignored; a missing file is seeded with the defaults so users have
//! something to edit.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{info, warn};

use crate::highlight::DEFAULT_ANIMATION;
use crate::launch::DEFAULT_SETTLE;
use crate::selection::DEFAULT_WEB_LABEL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_query_url")]
    pub query_url: String,

    #[serde(default = "default_launch_url")]
    pub launch_url: String,

    /// Wait between a completed launch and the close sentinel
    #[serde(default = "default_launch_settle_ms")]
    pub launch_settle_ms: u64,

    /// Slide duration of the highlight bar; 0 disables the animation
    #[serde(default = "default_highlight_animation_ms")]
    pub highlight_animation_ms: u64,

    /// Label of the web-search row, `{query}` is replaced with the input
    #[serde(default = "default_web_search_label")]
    pub web_search_label: String,

    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_query_url() -> String {
    aether_rpc::DEFAULT_QUERY_URL.to_string()
}

fn default_launch_url() -> String {
    aether_rpc::DEFAULT_LAUNCH_URL.to_string()
}

#[allow(clippy::cast_possible_truncation)] // constant well below u64::MAX
fn default_launch_settle_ms() -> u64 {
    DEFAULT_SETTLE.as_millis() as u64
}

#[allow(clippy::cast_possible_truncation)]
fn default_highlight_animation_ms() -> u64 {
    DEFAULT_ANIMATION.as_millis() as u64
}

fn default_web_search_label() -> String {
    DEFAULT_WEB_LABEL.to_string()
}

fn default_placeholder() -> String {
    "Search...".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_url: default_query_url(),
            launch_url: default_launch_url(),
            launch_settle_ms: default_launch_settle_ms(),
            highlight_animation_ms: default_highlight_animation_ms(),
            web_search_label: default_web_search_label(),
            placeholder: default_placeholder(),
        }
    }
}

impl Config {
    /// `~/.config/aether-launcher/config.json` on Linux. `None` when no home
    /// directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "aether-launcher")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from `path`, falling back to defaults on any problem.
    pub fn load_from(path: &Path) -> Self {
        load_or_seed(path)
    }

    /// `colors.json` lives next to the config file.
    pub fn colors_path(config_path: &Path) -> PathBuf {
        config_path.with_file_name("colors.json")
    }

    pub fn launch_settle(&self) -> Duration {
        Duration::from_millis(self.launch_settle_ms)
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_animation_ms)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Read a JSON settings file. A missing file is written with the defaults;
/// an unreadable one is reported and replaced by the defaults in memory.
pub(crate) fn load_or_seed<T>(path: &Path) -> T
where
    T: Default + Serialize + DeserializeOwned,
{
    if !path.exists() {
        let value = T::default();
        match write_json(&value, path) {
            Ok(()) => info!("Wrote defaults to {}", path.display()),
            Err(e) => warn!("Could not write defaults to {}: {e}", path.display()),
        }
        return value;
    }

    match read_json(path) {
        Ok(value) => {
            info!("Loaded {}", path.display());
            value
        }
        Err(e) => {
            warn!("Failed to load {}: {e}", path.display());
            T::default()
        }
    }
}
