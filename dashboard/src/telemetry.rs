//! Host resource metrics

use std::path::Path;

use sysinfo::{Disks, System};
use tracing::warn;

use crate::models::system::HostMetrics;

fn percent(used: u64, total: u64) -> f32 {
    if total > 0 {
        (used as f32 / total as f32) * 100.0
    } else {
        0.0
    }
}

/// Collect host metrics; blocks for one CPU sampling interval
pub fn collect_host_metrics() -> HostMetrics {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu_usage();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_usage();

    let disks = Disks::new_with_refreshed_list();

    // Root filesystem when mounted, otherwise every disk
    let (disk_used, disk_total) = match disks.iter().find(|d| d.mount_point() == Path::new("/")) {
        Some(root) => (
            root.total_space().saturating_sub(root.available_space()),
            root.total_space(),
        ),
        None => disks.iter().fold((0u64, 0u64), |(used, total), disk| {
            (
                used + disk.total_space().saturating_sub(disk.available_space()),
                total + disk.total_space(),
            )
        }),
    };

    let memory_used = sys.used_memory();
    let memory_total = sys.total_memory();

    HostMetrics {
        cpu_usage: sys.global_cpu_usage(),
        cpu_count: sys.cpus().len(),
        memory_used,
        memory_total,
        memory_percent: percent(memory_used, memory_total),
        disk_used,
        disk_total,
        disk_percent: percent(disk_used, disk_total),
        uptime_secs: System::uptime(),
        hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
    }
}

/// [`collect_host_metrics`] off the async runtime
pub async fn sample_host_metrics() -> Option<HostMetrics> {
    match tokio::task::spawn_blocking(collect_host_metrics).await {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!("Host metrics sampling failed: {}", e);
            None
        }
    }
}
