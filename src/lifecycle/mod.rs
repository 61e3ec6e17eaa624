//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Provision keys → Share
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown
//!     SIGHUP → Reload (full load, swap only on success)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: configuration must be ready before anything serves
//! - A failed reload keeps the running configuration

pub mod signals;
pub mod startup;

pub use signals::{LifecycleEvent, Signals};
pub use startup::{startup, ConfigSummary, KeySummary};
