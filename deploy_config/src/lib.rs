pub mod compiler;
pub mod config;
pub mod env;
pub mod error;
pub mod explorer;
pub mod network;

pub use config::{DeployConfig, DEFAULT_CONFIG_PATH};
pub use error::ConfigError;
pub use network::{Credential, NetworkProfile};
