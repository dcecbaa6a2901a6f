//! Subprocess execution and output streaming

pub mod runner;
pub mod stream;

pub use runner::{BackgroundProcess, ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use stream::LineStream;
