//! Settings and host layout

pub mod layout;
pub mod settings;

pub use layout::HostLayout;
pub use settings::{DataSourceMode, Settings};
