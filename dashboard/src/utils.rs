//! Utility functions

use serde::{Deserialize, Serialize};

/// Version information for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("DOKKU_DASH_COMMIT").unwrap_or("unknown").to_string(),
        build_time: option_env!("DOKKU_DASH_BUILT_AT").unwrap_or("unknown").to_string(),
    }
}

/// Shorten command output for log lines
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
