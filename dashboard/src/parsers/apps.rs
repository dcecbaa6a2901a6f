//! `apps:list`, `ps:report`, `domains:report`, `git:report`, `ps:scale`

use crate::models::app::{ApplicationStatus, ProcessScale, ProcessSnapshot};
use crate::parsers::{first_integer, is_border, marker_value};

const DOMAINS_MARKER: &str = "Domains app vhosts:";
const COUNT_MARKERS: [&str; 2] = ["Processes:", "Running:"];
const DEPLOY_BRANCH_MARKER: &str = "Git deploy branch:";
const RUNNING_MARKER: &str = "Running:";

/// App names, one per line after the header
pub fn parse_app_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("=====>") && !line.starts_with("----->"))
        .filter(|line| !line.starts_with('!'))
        .map(str::to_string)
        .collect()
}

pub fn parse_domains(output: &str) -> Vec<String> {
    marker_value(output, DOMAINS_MARKER)
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// First integer on a `Processes:` or `Running:` line, 0 otherwise
pub fn parse_container_count(output: &str) -> u32 {
    output
        .lines()
        .filter(|line| COUNT_MARKERS.iter().any(|marker| line.contains(marker)))
        .find_map(first_integer)
        .and_then(|count| u32::try_from(count).ok())
        .unwrap_or(0)
}

pub fn parse_deploy_source(output: &str) -> String {
    output
        .lines()
        .filter(|line| line.contains(DEPLOY_BRANCH_MARKER))
        .filter_map(|line| line.split_once(':'))
        .map(|(_, rest)| rest.trim())
        .find(|rest| !rest.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Status from the per-container `Status <type> <n>:` lines of `ps:report`.
///
/// Without container lines the `Running:` summary is used; no signal at all
/// is `Unknown`.
pub fn parse_process_status(output: &str) -> ApplicationStatus {
    let states: Vec<ApplicationStatus> = output
        .lines()
        .filter_map(container_state)
        .collect();

    if !states.is_empty() {
        return ApplicationStatus::aggregate(states);
    }

    match marker_value(output, RUNNING_MARKER).as_deref().map(str::to_lowercase) {
        Some(value) if value == "true" || value == "mixed" => ApplicationStatus::Running,
        Some(value) if value == "false" => ApplicationStatus::Stopped,
        _ => ApplicationStatus::Unknown,
    }
}

/// Status and container count from one `ps:report`
pub fn parse_process_report(output: &str) -> ProcessSnapshot {
    ProcessSnapshot {
        status: parse_process_status(output),
        container_count: parse_container_count(output),
    }
}

/// `Status web 1:   running (CID: 5a2b3c4d5e6)` -> state word
fn container_state(line: &str) -> Option<ApplicationStatus> {
    let (key, value) = line.trim().split_once(':')?;
    let mut words = key.split_whitespace();
    if words.next()? != "Status" {
        return None;
    }
    // process type and index
    words.next()?;
    words.next()?.parse::<u32>().ok()?;

    let state = value.split_whitespace().next()?;
    Some(ApplicationStatus::from_container_state(state, None))
}

/// `type: count` lines; anything that does not parse is dropped
pub fn parse_scale(output: &str) -> Vec<ProcessScale> {
    output
        .lines()
        .filter(|line| !is_border(line))
        .filter_map(|line| line.split_once(':'))
        .filter_map(|(process_type, quantity)| {
            let process_type = process_type.trim();
            let quantity = quantity.trim().parse::<u32>().ok()?;
            (!process_type.is_empty()).then(|| ProcessScale::new(process_type, quantity))
        })
        .collect()
}
