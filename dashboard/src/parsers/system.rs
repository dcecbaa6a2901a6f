//! `plugin:list` and `version`

use crate::models::system::Plugin;
use crate::parsers::is_border;

/// `  letsencrypt   0.20.4 enabled    Automated installation of let's encrypt TLS certificates`
pub fn parse_plugin_list(output: &str) -> Vec<Plugin> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_border(line) && !line.starts_with('!'))
        .filter_map(parse_plugin_row)
        .collect()
}

fn parse_plugin_row(line: &str) -> Option<Plugin> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let version = tokens.next()?;
    let rest: Vec<&str> = tokens.collect();

    let (enabled, description) = match rest.first() {
        Some(&"enabled") => (true, &rest[1..]),
        Some(&"disabled") => (false, &rest[1..]),
        _ => (true, &rest[..]),
    };

    Some(Plugin {
        name: name.to_string(),
        version: version.to_string(),
        enabled,
        description: description.join(" "),
    })
}

/// `dokku version 0.35.12` -> `0.35.12`
pub fn parse_dokku_version(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.to_lowercase().contains("version"))
        .and_then(|line| line.split_whitespace().last())
        .map(|version| version.trim_start_matches('v').to_string())
        .filter(|version| version.chars().next().is_some_and(|c| c.is_ascii_digit()))
}
