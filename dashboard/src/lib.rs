//! Dokku Dashboard Library
//!
//! Data-source and reconciliation core for a Dokku dashboard: reads
//! application state from the local host or over ssh and exposes it
//! through [`client::DokkuClient`].

pub mod client;
pub mod command;
pub mod config;
pub mod errors;
pub mod filesys;
pub mod local;
pub mod logs;
pub mod models;
pub mod parsers;
pub mod process;
pub mod remote;
pub mod telemetry;
pub mod utils;
