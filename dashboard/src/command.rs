//! Dokku command composition
//!
//! A [`DokkuCommand`] renders two ways: an argument vector for the local
//! `dokku` binary (no shell involved) and a single shell string for the
//! remote channel, where every argument is quoted so that a POSIX shell
//! splits it back into exactly the original words.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::DashboardError;
use crate::models::app::LifecycleAction;

static APP_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("valid app name regex"));

static ENV_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid env key regex"));

/// Dokku app (and service) naming rule
pub fn is_valid_app_name(name: &str) -> bool {
    APP_NAME_RE.is_match(name)
}

/// Environment variable key rule
pub fn is_valid_env_key(key: &str) -> bool {
    ENV_KEY_RE.is_match(key)
}

pub fn validate_app_name(name: &str) -> Result<(), DashboardError> {
    if is_valid_app_name(name) {
        Ok(())
    } else {
        Err(DashboardError::ValidationError(format!(
            "Invalid app name: {:?}",
            name
        )))
    }
}

pub fn validate_env_key(key: &str) -> Result<(), DashboardError> {
    if is_valid_env_key(key) {
        Ok(())
    } else {
        Err(DashboardError::ValidationError(format!(
            "Invalid environment key: {:?}",
            key
        )))
    }
}

/// Quote one word for a POSIX shell.
///
/// Words made only of safe characters pass through; anything else is
/// wrapped in single quotes with each embedded `'` rewritten as `'"'"'`.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@%+,".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\"'\"'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Word(String),
    Assign { key: String, value: String },
}

/// A dokku subcommand with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DokkuCommand {
    subcommand: String,
    args: Vec<Arg>,
}

impl DokkuCommand {
    pub fn new(subcommand: impl Into<String>) -> Self {
        Self {
            subcommand: subcommand.into(),
            args: Vec::new(),
        }
    }

    /// Add a plain argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Word(arg.into()));
        self
    }

    /// Add an argument only when `condition` holds
    pub fn arg_if(self, condition: bool, arg: impl Into<String>) -> Self {
        if condition {
            self.arg(arg)
        } else {
            self
        }
    }

    /// Add a `KEY=value` assignment
    pub fn assign(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(Arg::Assign {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn subcommand(&self) -> &str {
        &self.subcommand
    }

    /// Arguments for the local binary, one element per word
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.subcommand.clone());
        for arg in &self.args {
            args.push(match arg {
                Arg::Word(word) => word.clone(),
                Arg::Assign { key, value } => format!("{}={}", key, value),
            });
        }
        args
    }

    /// Single command string for the remote shell
    pub fn to_shell_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(shell_quote(&self.subcommand));
        for arg in &self.args {
            parts.push(match arg {
                Arg::Word(word) => shell_quote(word),
                // Values are always quoted, keys are validated identifiers
                Arg::Assign { key, value } => {
                    format!("{}='{}'", key, value.replace('\'', "'\"'\"'"))
                }
            });
        }
        parts.join(" ")
    }
}

/// Commands issued by the dashboard
impl DokkuCommand {
    /// `<subcommand> <app>`, e.g. `ps:report blog`
    pub fn for_app(subcommand: &str, app: &str) -> Self {
        Self::new(subcommand).arg(app)
    }

    pub fn lifecycle(action: LifecycleAction, app: &str) -> Self {
        Self::for_app(action.subcommand(), app)
    }

    pub fn config_set(app: &str, key: &str, value: &str, restart: bool) -> Self {
        Self::new("config:set")
            .arg_if(!restart, "--no-restart")
            .arg(app)
            .assign(key, value)
    }

    pub fn config_unset(app: &str, key: &str, restart: bool) -> Self {
        Self::new("config:unset")
            .arg_if(!restart, "--no-restart")
            .arg(app)
            .arg(key)
    }

    /// `logs <app> -n <lines>`, following with `-t`
    pub fn logs(app: &str, lines: u32, follow: bool) -> Self {
        Self::for_app("logs", app)
            .arg_if(follow, "-t")
            .arg("-n")
            .arg(lines.to_string())
    }
}

impl fmt::Display for DokkuCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_string())
    }
}
