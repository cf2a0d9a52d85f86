//! Studio configuration.
//!
//! Loaded from `~/.folio/config.json` when present, otherwise assembled
//! from environment variables (`FOLIO_PROJECT_ID`, `FOLIO_DATASET`,
//! `FOLIO_API_TOKEN`). The environment always overrides the file so a
//! deployment can swap datasets without editing config on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// What the store does when a remote result is empty or failed.
///
/// `Fallback` substitutes the static records in [`crate::fallback`];
/// `EmptyState` surfaces `Empty`/`Failed` for the page to render its own
/// empty-state. Resolved once per deployment, never per hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyPolicy {
    Fallback,
    #[default]
    EmptyState,
}

/// Configuration stored in ~/.folio/config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentConfig {
    pub project_id: String,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Query through the CDN edge (cached reads) instead of the live API.
    #[serde(default = "default_use_cdn")]
    pub use_cdn: bool,
    /// Bearer token for private datasets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Staleness window for cached content, in seconds.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    #[serde(default)]
    pub on_empty: EmptyPolicy,
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "2024-01-01".to_string()
}

fn default_use_cdn() -> bool {
    true
}

fn default_stale_after_secs() -> u64 {
    300
}

impl ContentConfig {
    /// Minimal config for a public dataset.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: default_dataset(),
            api_version: default_api_version(),
            use_cdn: default_use_cdn(),
            token: None,
            stale_after_secs: default_stale_after_secs(),
            on_empty: EmptyPolicy::default(),
        }
    }

    /// Load from the canonical path, then apply environment overrides.
    pub fn load() -> Result<Self, ContentError> {
        let path = config_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::new(String::new())
        };
        apply_overrides(&mut config, |key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a config file.
    pub fn load_from(path: &Path) -> Result<Self, ContentError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ContentError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ContentError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if self.project_id.is_empty() {
            return Err(ContentError::Config(
                "projectId is not set (config file or FOLIO_PROJECT_ID)".to_string(),
            ));
        }
        if self.stale_after_secs == 0 {
            return Err(ContentError::Config(
                "staleAfterSecs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

/// Get the canonical config file path (~/.folio/config.json)
pub fn config_path() -> Result<PathBuf, ContentError> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContentError::Config("could not find home directory".to_string()))?;
    Ok(home.join(".folio").join("config.json"))
}

/// Apply environment-style overrides onto a config.
///
/// Separate from `load()` and parameterized over the lookup so tests don't
/// have to mutate process environment.
fn apply_overrides(config: &mut ContentConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(project_id) = lookup("FOLIO_PROJECT_ID") {
        config.project_id = project_id;
    }
    if let Some(dataset) = lookup("FOLIO_DATASET") {
        config.dataset = dataset;
    }
    if let Some(token) = lookup("FOLIO_API_TOKEN") {
        if token.is_empty() {
            config.token = None;
        } else {
            config.token = Some(token);
        }
    }
}
