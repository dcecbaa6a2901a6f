//! Integration tests for the dashboard core

mod common;
mod test_client;
mod test_local_source;
mod test_log_stream;
mod test_remote_source;
