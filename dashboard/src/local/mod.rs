//! Local state reader: docker, dokku directories and the local dokku CLI

pub mod docker;
pub mod dokku;
pub mod files;
pub mod state;

pub use docker::DockerCli;
pub use dokku::DokkuCli;
pub use state::LocalStateReader;
