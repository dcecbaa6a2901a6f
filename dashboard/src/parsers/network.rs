//! `network:report` and `ports:report`

use crate::models::report::{NetworkConfig, PortMapping};
use crate::parsers::{first_marker_value, parse_flag, split_list};

/// Computed values first, app-level values as fallback
fn network_field(output: &str, field: &str) -> String {
    let computed = format!("Network computed {}:", field);
    let app = format!("Network {}:", field);
    first_marker_value(output, &[&computed, &app]).unwrap_or_default()
}

pub fn parse_network(output: &str) -> NetworkConfig {
    NetworkConfig {
        attach_post_create: split_list(&network_field(output, "attach post create")),
        attach_post_deploy: split_list(&network_field(output, "attach post deploy")),
        bind_all_interfaces: parse_flag(&network_field(output, "bind all interfaces")),
        initial_network: network_field(output, "initial network"),
        static_web_listener: network_field(output, "static web listener"),
        tld: network_field(output, "tld"),
        web_listeners: split_list(&network_field(output, "web listeners")),
        port_mappings: Vec::new(),
    }
}

/// `Ports map:` entries, falling back to the detected map
pub fn parse_port_map(output: &str) -> Vec<PortMapping> {
    first_marker_value(output, &["Ports map:", "Ports map detected:"])
        .map(|value| value.split_whitespace().filter_map(parse_port_entry).collect())
        .unwrap_or_default()
}

/// `http:80:5000`
fn parse_port_entry(entry: &str) -> Option<PortMapping> {
    let mut parts = entry.split(':');
    let scheme = parts.next()?.trim();
    let host_port = parts.next()?.trim().parse().ok()?;
    let container_port = parts.next()?.trim().parse().ok()?;
    if scheme.is_empty() || parts.next().is_some() {
        return None;
    }
    Some(PortMapping {
        scheme: scheme.to_string(),
        host_port,
        container_port,
    })
}
