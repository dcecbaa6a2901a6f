//! `checks:report`

use crate::models::report::HealthCheckConfig;
use crate::parsers::{first_integer, first_marker_value, marker_value, split_list};

pub fn parse_checks(output: &str) -> HealthCheckConfig {
    let list = |marker: &str| {
        marker_value(output, marker)
            .map(|value| split_list(&value))
            .unwrap_or_default()
    };

    HealthCheckConfig {
        disabled: list("Checks disabled list:"),
        skipped: list("Checks skipped list:"),
        wait_to_retire_secs: first_marker_value(
            output,
            &[
                "Checks computed wait to retire:",
                "Checks wait to retire:",
                "Checks global wait to retire:",
            ],
        )
        .and_then(|value| first_integer(&value))
        .and_then(|secs| u32::try_from(secs).ok()),
    }
}
