//! Remote command channel

pub mod ssh;

pub use ssh::{SshBatch, SshRunner, SshTarget};
