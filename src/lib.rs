//! Registry auth gateway library.
//!
//! Configuration ingestion and credential provisioning for a token
//! authentication gateway in front of a container registry.

pub mod authn;
pub mod authz;
pub mod backend;
pub mod config;
pub mod credentials;
pub mod lifecycle;
pub mod observability;

pub use config::{load_config, Config, ConfigError, LoadedConfig, SharedConfig};
pub use credentials::{Credentials, KeyPair};
