//! Log line model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display hint derived from the line text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Error,
    Warn,
    Info,
    Plain,
}

impl LogSeverity {
    /// Case-insensitive substring classification, error wins over warn over info
    pub fn classify(line: &str) -> Self {
        let lowered = line.to_lowercase();
        if lowered.contains("err") {
            LogSeverity::Error
        } else if lowered.contains("warn") {
            LogSeverity::Warn
        } else if lowered.contains("info") {
            LogSeverity::Info
        } else {
            LogSeverity::Plain
        }
    }
}

/// A timestamped application log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogLine {
    /// Split a leading RFC 3339 timestamp off `raw`; fall back to `received_at`
    pub fn parse(raw: &str, received_at: DateTime<Utc>) -> Self {
        let raw = raw.trim_end_matches(['\r', '\n']);
        if let Some((head, rest)) = raw.split_once(' ') {
            if let Ok(ts) = DateTime::parse_from_rfc3339(head) {
                return Self {
                    timestamp: ts.with_timezone(&Utc),
                    message: rest.to_string(),
                };
            }
        }
        Self {
            timestamp: received_at,
            message: raw.to_string(),
        }
    }

    /// Computed per call from the message
    pub fn severity(&self) -> LogSeverity {
        LogSeverity::classify(&self.message)
    }
}
