//! Parsers for dokku report output
//!
//! Every parser takes one raw text block and never fails: a missing or
//! malformed field falls back to its default without affecting the others.

pub mod apps;
pub mod certs;
pub mod checks;
pub mod config;
pub mod network;
pub mod services;
pub mod storage;
pub mod system;

use std::sync::LazyLock;

use regex::Regex;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));

/// Trimmed text after `marker` on the last line containing it
pub(crate) fn marker_value(output: &str, marker: &str) -> Option<String> {
    output
        .lines()
        .filter_map(|line| {
            line.find(marker)
                .map(|idx| line[idx + marker.len()..].trim().to_string())
        })
        .last()
}

/// First marker present wins; an empty value counts as absent
pub(crate) fn first_marker_value(output: &str, markers: &[&str]) -> Option<String> {
    markers
        .iter()
        .filter_map(|marker| marker_value(output, marker))
        .find(|value| !value.is_empty())
}

/// Report headers (`=====>`) and table rules (`----`)
pub(crate) fn is_border(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('=') || trimmed.starts_with('-')
}

pub(crate) fn first_integer(text: &str) -> Option<u64> {
    INTEGER_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

pub(crate) fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Whitespace or comma separated list; `none` and `-` mean empty
pub(crate) fn split_list(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") || value == "-" {
        return Vec::new();
    }
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
