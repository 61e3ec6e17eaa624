//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, backend defaults, secret files)
//!     → loader.rs (server/token key pairs, Let's Encrypt cache check)
//!     → LoadedConfig (validated, immutable, credential-equipped)
//!     → shared.rs (Arc snapshot read by all request handlers)
//!
//! On reload (SIGHUP or watcher.rs detecting a change):
//!     → loader.rs loads a complete new config
//!     → only if every step succeeds, atomic swap in shared.rs
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - First violated invariant is reported; no partial or degraded startup
//! - Derived key material lives in `Credentials`, beside the config

pub mod loader;
pub mod schema;
pub mod shared;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_config_from_str, ConfigError, ConfigFormat, Identity, LoadedConfig};
pub use schema::{Config, KeyFiles, LetsEncryptConfig, ServerConfig, TokenConfig};
pub use shared::SharedConfig;
pub use watcher::ConfigWatcher;
pub use validation::{validate_config, ValidationError};
