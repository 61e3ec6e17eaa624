//! GitHub OAuth backend settings (`github_auth`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::backend::{read_secret_file, BackendError, Validate};

/// Used when `http_timeout` is unset or zero.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Used when `revalidate_after` is unset or zero.
pub const DEFAULT_REVALIDATE_AFTER: Duration = Duration::from_secs(60 * 60);

pub const DEFAULT_WEB_URI: &str = "https://github.com";
pub const DEFAULT_API_URI: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct GitHubAuthConfig {
    /// Only members of this organization may sign in.
    pub organization: String,

    pub client_id: String,

    pub client_secret: String,

    /// File holding the client secret; overrides `client_secret`.
    pub client_secret_file: Option<PathBuf>,

    /// Local database persisting issued tokens.
    pub token_db: Option<PathBuf>,

    /// Google Cloud Storage bucket persisting issued tokens.
    pub gcs_token_db: Option<GcsStoreConfig>,

    #[serde(deserialize_with = "crate::backend::duration::deserialize")]
    pub http_timeout: Option<Duration>,

    /// How long a GitHub token is trusted before organization membership
    /// is checked again.
    #[serde(deserialize_with = "crate::backend::duration::deserialize")]
    pub revalidate_after: Option<Duration>,

    pub github_web_uri: String,

    pub github_api_uri: String,

    /// Registry address shown on the sign-in page.
    pub registry_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct GcsStoreConfig {
    pub bucket: String,

    /// Service account credentials for the bucket.
    pub client_secret_file: String,
}

/// Where issued GitHub tokens are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStore<'a> {
    Local(&'a Path),
    Gcs(&'a GcsStoreConfig),
}

impl GitHubAuthConfig {
    /// The configured token store, if exactly one is set.
    pub fn token_store(&self) -> Option<TokenStore<'_>> {
        match (&self.token_db, &self.gcs_token_db) {
            (Some(path), None) => Some(TokenStore::Local(path)),
            (None, Some(gcs)) => Some(TokenStore::Gcs(gcs)),
            _ => None,
        }
    }

    fn check_token_store(&self, key: &str) -> Result<(), BackendError> {
        match self.token_store() {
            Some(TokenStore::Gcs(gcs)) if gcs.bucket.is_empty() || gcs.client_secret_file.is_empty() => {
                Err(BackendError::MissingFields(format!(
                    "{key}.gcs_token_db.{{bucket,client_secret_file}}"
                )))
            }
            Some(_) => Ok(()),
            None if self.token_db.is_some() => Err(BackendError::invalid(
                format!("{key}.token_db"),
                "token_db and gcs_token_db are mutually exclusive",
            )),
            None => Err(BackendError::MissingFields(format!(
                "{key}.{{client_id,client_secret,token_db}}"
            ))),
        }
    }
}

impl Validate for GitHubAuthConfig {
    fn validate(&mut self, key: &str) -> Result<(), BackendError> {
        if let Some(path) = &self.client_secret_file {
            self.client_secret = read_secret_file(path)?;
        }
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(BackendError::MissingFields(format!(
                "{key}.{{client_id,client_secret,token_db}}"
            )));
        }
        self.check_token_store(key)?;

        if self.http_timeout.map_or(true, |t| t.is_zero()) {
            self.http_timeout = Some(DEFAULT_HTTP_TIMEOUT);
        }
        if self.revalidate_after.map_or(true, |t| t.is_zero()) {
            self.revalidate_after = Some(DEFAULT_REVALIDATE_AFTER);
        }

        for (field, value, default) in [
            ("github_web_uri", &mut self.github_web_uri, DEFAULT_WEB_URI),
            ("github_api_uri", &mut self.github_api_uri, DEFAULT_API_URI),
        ] {
            if value.is_empty() {
                *value = default.to_string();
            } else {
                Url::parse(value.as_str()).map_err(|e| BackendError::invalid(format!("{key}.{field}"), e))?;
            }
        }
        Ok(())
    }
}
