//! `.semerge.toml` configuration, loaded before CLI flags are applied on
//! top (§6 configuration option list).

use crate::moves::MoveConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Tunables recognized by one merge invocation. CLI flags take precedence
/// over whatever is loaded here; the file itself is entirely optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub dry_run: bool,
    pub create_backup: bool,
    pub verbose: bool,
    pub git_timeout_secs: u64,
    pub max_file_size: usize,
    #[serde(rename = "move")]
    pub move_config: MoveTuning,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            dry_run: false,
            create_backup: true,
            verbose: false,
            git_timeout_secs: 10,
            max_file_size: 5 * 1024 * 1024,
            move_config: MoveTuning::default(),
        }
    }
}

impl MergeConfig {
    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }

    /// Load `.semerge.toml` from `workspace_root`, if present. A missing
    /// file is not an error; a malformed one is.
    pub fn load(workspace_root: &Path) -> Result<Self, crate::error::SemergeError> {
        let path = workspace_root.join(".semerge.toml");
        match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|e| crate::error::SemergeError::ParseFailure { message: format!(".semerge.toml: {e}") }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MergeConfig::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serde mirror of [`MoveConfig`] (which intentionally has no serde deps of
/// its own, since it is also constructed directly in unit tests).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MoveTuning {
    pub min_token_count: usize,
    pub fuzzy_threshold: f64,
    pub small_body_tokens: usize,
    pub small_body_threshold: f64,
    pub large_body_tokens: usize,
    pub large_body_threshold: f64,
}

impl Default for MoveTuning {
    fn default() -> Self {
        let d = MoveConfig::default();
        MoveTuning {
            min_token_count: d.min_token_count,
            fuzzy_threshold: d.fuzzy_threshold,
            small_body_tokens: d.small_body_tokens,
            small_body_threshold: d.small_body_threshold,
            large_body_tokens: d.large_body_tokens,
            large_body_threshold: d.large_body_threshold,
        }
    }
}

impl From<MoveTuning> for MoveConfig {
    fn from(t: MoveTuning) -> Self {
        MoveConfig {
            exact_enabled: true,
            fuzzy_enabled: true,
            min_token_count: t.min_token_count,
            small_body_tokens: t.small_body_tokens,
            small_body_threshold: t.small_body_threshold,
            large_body_tokens: t.large_body_tokens,
            large_body_threshold: t.large_body_threshold,
            fuzzy_threshold: t.fuzzy_threshold,
        }
    }
}
