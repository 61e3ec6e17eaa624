//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config loading, credential provisioning, reloads
//!     → tracing events with structured fields
//!     → logging.rs subscriber (EnvFilter + fmt)
//!     → stdout
//! ```

pub mod logging;
