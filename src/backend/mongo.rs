//! MongoDB connection settings shared by `mongo_auth` and `acl_mongo`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::backend::{read_secret_file, BackendError};

/// Connect timeout used when `dial_info.timeout` is unset or zero.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct DialInfo {
    /// Seed list of `host:port` servers.
    pub addrs: Vec<String>,

    /// Connect timeout.
    #[serde(deserialize_with = "crate::backend::duration::deserialize")]
    pub timeout: Option<Duration>,

    pub database: String,

    pub username: String,

    /// Inline password; replaced by the contents of `password_file` when set.
    pub password: String,

    pub replica_set: String,

    /// Talk to the given server only, ignoring the rest of the cluster.
    pub direct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct MongoConfig {
    pub dial_info: DialInfo,

    /// File holding the password, kept out of the main configuration.
    pub password_file: Option<PathBuf>,

    pub enable_tls: bool,
}

impl MongoConfig {
    /// Check connection settings for the section under `key`.
    pub fn validate(&mut self, key: &str) -> Result<(), BackendError> {
        if self.dial_info.addrs.is_empty() {
            return Err(BackendError::MissingField(format!("{key}.dial_info.addrs")));
        }
        if self.dial_info.timeout.map_or(true, |t| t.is_zero()) {
            self.dial_info.timeout = Some(DEFAULT_DIAL_TIMEOUT);
        }
        if let Some(path) = &self.password_file {
            self.dial_info.password = read_secret_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addrs_required() {
        let mut cfg = MongoConfig::default();
        let err = cfg.validate("mongo_auth").unwrap_err();
        assert_eq!(err.to_string(), "mongo_auth.dial_info.addrs is required");
    }

    #[test]
    fn test_timeout_default_injected() {
        let mut cfg = MongoConfig::default();
        cfg.dial_info.addrs = vec!["localhost:27017".into()];

        cfg.validate("acl_mongo").unwrap();
        assert_eq!(cfg.dial_info.timeout, Some(DEFAULT_DIAL_TIMEOUT));
    }

    #[test]
    fn test_password_file_substituted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mongo.pw");
        std::fs::write(&path, "hunter2\n").unwrap();

        let mut cfg = MongoConfig::default();
        cfg.dial_info.addrs = vec!["localhost:27017".into()];
        cfg.password_file = Some(path);

        cfg.validate("mongo_auth").unwrap();
        assert_eq!(cfg.dial_info.password, "hunter2");
    }
}
