//! `storage:report` and docker option mount flags

use crate::models::report::{MountPhase, StorageMount};
use crate::parsers::marker_value;

const PHASE_MARKERS: [(MountPhase, &str); 3] = [
    (MountPhase::Build, "Storage build mounts:"),
    (MountPhase::Deploy, "Storage deploy mounts:"),
    (MountPhase::Run, "Storage run mounts:"),
];

/// Mounts of all phases, merged by host/container path
pub fn parse_storage(output: &str) -> Vec<StorageMount> {
    let mut mounts = Vec::new();
    for (phase, marker) in PHASE_MARKERS {
        if let Some(value) = marker_value(output, marker) {
            merge_mounts(&mut mounts, phase, &value);
        }
    }
    mounts
}

/// Add the `-v` mounts found in `options` to `mounts` for `phase`
pub fn merge_mounts(mounts: &mut Vec<StorageMount>, phase: MountPhase, options: &str) {
    for spec in volume_specs(options) {
        let Some(mount) = parse_mount_spec(&spec) else {
            continue;
        };
        match mounts
            .iter_mut()
            .find(|m| m.host_path == mount.host_path && m.container_path == mount.container_path)
        {
            Some(existing) => {
                if !existing.phases.contains(&phase) {
                    existing.phases.push(phase);
                }
            }
            None => mounts.push(StorageMount {
                phases: vec![phase],
                ..mount
            }),
        }
    }
}

/// Values of `-v x`, `-v=x`, `--volume x` and `--volume=x`
fn volume_specs(options: &str) -> Vec<String> {
    let mut specs = Vec::new();
    let mut tokens = options.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "-v" | "--volume" => {
                if let Some(value) = tokens.next() {
                    specs.push(value.to_string());
                }
            }
            _ => {
                if let Some(value) = token
                    .strip_prefix("--volume=")
                    .or_else(|| token.strip_prefix("-v="))
                {
                    specs.push(value.to_string());
                }
            }
        }
    }
    specs
}

/// `host:container[:options]`
fn parse_mount_spec(spec: &str) -> Option<StorageMount> {
    let spec = spec.trim_matches(|c| c == '"' || c == '\'');
    let mut parts = spec.splitn(3, ':');
    let host_path = parts.next()?.trim();
    let container_path = parts.next()?.trim();
    if host_path.is_empty() || container_path.is_empty() {
        return None;
    }
    let options = parts.next().map(str::to_string).filter(|o| !o.is_empty());
    Some(StorageMount {
        host_path: host_path.to_string(),
        container_path: container_path.to_string(),
        options,
        phases: Vec::new(),
    })
}
