//! `<type>:list` and `<type>:info` of the datastore plugins

use crate::command::is_valid_app_name;
use crate::parsers::{is_border, marker_value, split_list};

/// Fields of one `<type>:info` report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceInfo {
    pub dsn: String,
    pub status: String,
    /// Image reference, e.g. `redis:7.2.4`
    pub version: String,
    pub links: Vec<String>,
    pub config_dir: String,
    pub data_dir: String,
}

/// Service names; table headers and notices are skipped
pub fn parse_service_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_border(line) && !line.starts_with('!'))
        .filter_map(|line| line.split_whitespace().next())
        .filter(|name| *name != "NAME" && is_valid_app_name(name))
        .map(str::to_string)
        .collect()
}

pub fn parse_service_info(output: &str) -> ServiceInfo {
    let field = |marker: &str| marker_value(output, marker).unwrap_or_default();

    ServiceInfo {
        dsn: field("Dsn:"),
        status: field("Status:"),
        version: field("Version:"),
        links: split_list(&field("Links:")),
        config_dir: field("Config dir:"),
        data_dir: field("Data dir:"),
    }
}
