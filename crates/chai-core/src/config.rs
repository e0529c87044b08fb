//! User configuration and space-directory resolution.
//!
//! The space directory is where chai keeps everything: the todo store,
//! `preferences.md`, `resources/`, and implementation logs. Resolution
//! order: `CHAI_SPACE` env var, then `space_dir` from the user config,
//! then `~/chai`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment override for the space directory.
pub const SPACE_ENV: &str = "CHAI_SPACE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Space directory; `None` falls back to `~/chai`.
    #[serde(default)]
    pub space_dir: Option<PathBuf>,

    /// How many recommendations a session shows per round.
    #[serde(default = "default_recommendations_count")]
    pub recommendations_count: usize,

    /// The coding-agent CLI launched from sessions.
    #[serde(default = "default_agent_command")]
    pub agent_command: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            space_dir: None,
            recommendations_count: default_recommendations_count(),
            agent_command: default_agent_command(),
        }
    }
}

fn default_recommendations_count() -> usize {
    3
}

fn default_agent_command() -> String {
    "claude".to_string()
}

/// Load the user config from `<config dir>/chai/config.toml`.
///
/// A missing file (or missing config dir) yields the defaults.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("chai/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the space directory from env, config, and home fallback.
#[must_use]
pub fn space_dir(config: &UserConfig) -> PathBuf {
    if let Ok(dir) = env::var(SPACE_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(dir) = &config.space_dir {
        return dir.clone();
    }

    dirs::home_dir()
        .map_or_else(|| PathBuf::from("chai"), |home| home.join("chai"))
}

/// `preferences.md` inside the space; always included in prompts.
#[must_use]
pub fn preferences_path(space: &Path) -> PathBuf {
    space.join("preferences.md")
}

/// The directory of markdown resources matched against task text.
#[must_use]
pub fn resources_dir(space: &Path) -> PathBuf {
    space.join("resources")
}

/// Where planning logs and cleaned transcripts land.
#[must_use]
pub fn implementation_logs_dir(space: &Path) -> PathBuf {
    space.join("implementation_logs")
}
