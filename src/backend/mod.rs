//! Contract shared by the pluggable backend configurations.
//!
//! # Responsibilities
//! - Define the `Validate` capability every backend section implements
//! - Provide the error type backend validation reports through
//! - Host the configuration shapes reused by authentication and
//!   authorization backends (external command, plugin, MongoDB)
//!
//! # Design Decisions
//! - Validation may write defaults back into the section; callers never
//!   observe zero-valued operational settings after it succeeds
//! - Secrets can live in separate files; their trimmed contents replace the
//!   inline value during validation

pub mod duration;
pub mod ext;
pub mod mongo;
pub mod plugin;

use std::fs;
use std::path::{Path, PathBuf};

pub use ext::ExtCommandConfig;
pub use mongo::{DialInfo, MongoConfig};
pub use plugin::PluginConfig;

/// Capability implemented by every optional backend section.
pub trait Validate {
    /// Check the section and fill in operational defaults.
    ///
    /// `key` is the configuration key the section was read from; it labels
    /// field names in error messages.
    fn validate(&mut self, key: &str) -> Result<(), BackendError>;
}

/// A backend section failed validation.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("{0} are required")]
    MissingFields(String),

    #[error("could not read {}: {}", .path.display(), .source)]
    SecretFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{field}: {reason}")]
    InvalidField { field: String, reason: String },
}

impl BackendError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

/// Read a secret from `path`, trimming surrounding whitespace.
pub fn read_secret_file(path: &Path) -> Result<String, BackendError> {
    let contents = fs::read_to_string(path).map_err(|source| BackendError::SecretFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_secret_file_trims() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "  s3cr3t\n").unwrap();

        assert_eq!(read_secret_file(file.path()).unwrap(), "s3cr3t");
    }

    #[test]
    fn test_read_secret_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = read_secret_file(&missing).unwrap_err();
        assert!(matches!(err, BackendError::SecretFile { ref path, .. } if *path == missing));
        assert!(err.to_string().starts_with("could not read "));
    }
}
