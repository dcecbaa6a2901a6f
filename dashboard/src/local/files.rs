//! Parsers for dokku's per-app state files

use std::collections::BTreeMap;

use crate::models::app::ProcessScale;
use crate::models::env_var::EnvironmentVariable;

/// `KEY=VALUE` lines, optionally `export`-prefixed and quoted.
///
/// Blank and `#` lines are skipped; a repeated key keeps the last value.
/// The result is sorted by key.
pub fn parse_env_file(contents: &str) -> Vec<EnvironmentVariable> {
    let mut vars = BTreeMap::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), unquote(value.trim()));
    }

    vars.into_iter()
        .map(|(key, value)| EnvironmentVariable::new(key, value))
        .collect()
}

/// Strip one level of shell quoting
fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        let inner = &value[1..value.len() - 1];
        return inner.replace("'\"'\"'", "'").replace("'\\''", "'");
    }
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        let inner = &value[1..value.len() - 1];
        return inner.replace("\\\"", "\"").replace("\\\\", "\\");
    }
    value.to_string()
}

/// Domains, one per line, in file order without duplicates
pub fn parse_vhost(contents: &str) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !domains.iter().any(|d| d == line) {
            domains.push(line.to_string());
        }
    }
    domains
}

/// `type=count` lines of `DOKKU_SCALE`
pub fn parse_scale_file(contents: &str) -> Vec<ProcessScale> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .filter_map(|(process_type, quantity)| {
            let quantity = quantity.trim().parse::<u32>().ok()?;
            let process_type = process_type.trim();
            (!process_type.is_empty()).then(|| ProcessScale::new(process_type, quantity))
        })
        .collect()
}

/// Value of the first of `keys` present in an ENV file
pub fn env_lookup(vars: &[EnvironmentVariable], keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| vars.iter().find(|var| var.key == *key))
        .map(|var| var.value.clone())
}
