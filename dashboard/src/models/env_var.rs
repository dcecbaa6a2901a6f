//! Environment variable model

use serde::{Deserialize, Serialize};

use crate::models::MASK;

/// Key fragments that mark a variable as sensitive (case-insensitive)
pub const SENSITIVE_KEYWORDS: [&str; 6] = ["password", "secret", "key", "token", "api", "private"];

/// Values longer than this are masked even when the key is harmless
pub const MAX_DISPLAY_LEN: usize = 50;

/// Environment variable of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub key: String,
    pub value: String,
    pub is_sensitive: bool,
}

impl EnvironmentVariable {
    /// Create a variable, deriving sensitivity from the key
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let is_sensitive = is_sensitive_key(&key);
        Self {
            key,
            value: value.into(),
            is_sensitive,
        }
    }

    /// Value safe for display: the fixed placeholder for sensitive or long values
    pub fn masked_value(&self) -> &str {
        if self.is_masked() {
            MASK
        } else {
            &self.value
        }
    }

    pub fn is_masked(&self) -> bool {
        self.is_sensitive || self.value.chars().count() > MAX_DISPLAY_LEN
    }
}

/// Case-insensitive substring match against [`SENSITIVE_KEYWORDS`]
pub fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    SENSITIVE_KEYWORDS.iter().any(|word| lowered.contains(word))
}
