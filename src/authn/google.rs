//! Google sign-in backend settings (`google_auth`).

use std::path::PathBuf;

use serde::Deserialize;

use crate::backend::{read_secret_file, BackendError, Validate};

/// HTTP timeout (seconds) used when `http_timeout` is unset or non-positive.
pub const DEFAULT_HTTP_TIMEOUT_SECS: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct GoogleAuthConfig {
    /// Restrict sign-in to accounts of this hosted domain.
    pub domain: String,

    pub client_id: String,

    pub client_secret: String,

    /// File holding the client secret; overrides `client_secret`.
    pub client_secret_file: Option<PathBuf>,

    /// Path of the local database persisting issued tokens.
    pub token_db: String,

    /// Timeout for calls to Google, in seconds.
    pub http_timeout: i64,
}

impl Validate for GoogleAuthConfig {
    fn validate(&mut self, key: &str) -> Result<(), BackendError> {
        if let Some(path) = &self.client_secret_file {
            self.client_secret = read_secret_file(path)?;
        }
        if self.client_id.is_empty() || self.client_secret.is_empty() || self.token_db.is_empty() {
            return Err(BackendError::MissingFields(format!(
                "{key}.{{client_id,client_secret,token_db}}"
            )));
        }
        if self.http_timeout <= 0 {
            self.http_timeout = DEFAULT_HTTP_TIMEOUT_SECS;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> GoogleAuthConfig {
        GoogleAuthConfig {
            client_id: "id.apps.googleusercontent.com".into(),
            client_secret: "secret".into(),
            token_db: "/var/lib/auth/google_tokens.ldb".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_required_fields() {
        let mut cfg = complete();
        cfg.token_db.clear();
        let err = cfg.validate("google_auth").unwrap_err();
        assert_eq!(
            err.to_string(),
            "google_auth.{client_id,client_secret,token_db} are required"
        );
    }

    #[test]
    fn test_http_timeout_defaults() {
        for timeout in [0, -3] {
            let mut cfg = complete();
            cfg.http_timeout = timeout;
            cfg.validate("google_auth").unwrap();
            assert_eq!(cfg.http_timeout, DEFAULT_HTTP_TIMEOUT_SECS);
        }

        let mut cfg = complete();
        cfg.http_timeout = 30;
        cfg.validate("google_auth").unwrap();
        assert_eq!(cfg.http_timeout, 30);
    }

    #[test]
    fn test_secret_file_fills_missing_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("google.secret");
        std::fs::write(&path, "  s3cr3t\n").unwrap();

        let mut cfg = complete();
        cfg.client_secret.clear();
        cfg.client_secret_file = Some(path);

        cfg.validate("google_auth").unwrap();
        assert_eq!(cfg.client_secret, "s3cr3t");
    }
}
