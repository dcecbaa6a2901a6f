//! Normalized entities returned by the client facade.
//!
//! Every value here is a snapshot rebuilt from host state on each query.

pub mod app;
pub mod certificate;
pub mod env_var;
pub mod log_line;
pub mod report;
pub mod service;
pub mod system;

pub use app::{
    ActionOutcome, AppDetail, Application, ApplicationStatus, LifecycleAction, ProcessScale,
    ProcessSnapshot,
};
pub use certificate::{CertificateColor, SslCertificate, SslStatus};
pub use env_var::EnvironmentVariable;
pub use log_line::{LogLine, LogSeverity};
pub use report::{HealthCheckConfig, MountPhase, NetworkConfig, PortMapping, StorageMount};
pub use service::{Service, ServiceStatus, ServiceType};
pub use system::{HostMetrics, Plugin, SystemInfo};

/// Fixed placeholder shown instead of any masked value
pub const MASK: &str = "••••••••";
