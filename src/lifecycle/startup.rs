//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Report what was loaded, without secrets
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal

use std::path::Path;

use serde::Serialize;

use crate::config::{load_config, ConfigError, LoadedConfig, SharedConfig};
use crate::credentials::KeyPair;

/// Operator-facing description of a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub addr: String,
    pub path_prefix: Option<String>,
    pub issuer: String,
    pub expiration_secs: i64,
    /// Number of static users; `None` when the table is absent.
    pub users: Option<usize>,
    pub authn: Vec<&'static str>,
    /// Number of ACL entries; `None` when the list is absent.
    pub acl_entries: Option<usize>,
    pub authz: Vec<&'static str>,
    pub server_key: Option<KeySummary>,
    pub token_key: KeySummary,
    pub token_uses_server_identity: bool,
    pub letsencrypt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySummary {
    pub algorithm: &'static str,
    pub key_id: String,
}

impl KeySummary {
    fn new(pair: &KeyPair) -> Self {
        Self {
            algorithm: pair.algorithm().as_str(),
            key_id: pair.key_id().to_string(),
        }
    }
}

impl ConfigSummary {
    pub fn new(loaded: &LoadedConfig) -> Self {
        let config = &loaded.config;
        let credentials = &loaded.credentials;
        Self {
            addr: config.server.listen_address.clone(),
            path_prefix: config.server.path_prefix.clone(),
            issuer: config.token.issuer.clone(),
            expiration_secs: config.token.expiration,
            users: config.users.as_ref().map(|u| u.len()),
            authn: config.authn.iter().map(|b| b.key()).collect(),
            acl_entries: config.acl.as_ref().map(|a| a.len()),
            authz: config.authz.iter().map(|b| b.key()).collect(),
            server_key: credentials.server().map(|pair| KeySummary::new(pair)),
            token_key: KeySummary::new(credentials.token()),
            token_uses_server_identity: credentials.token_uses_server_identity(),
            letsencrypt: credentials.server().is_none() && !config.server.letsencrypt.email.is_empty(),
        }
    }

    /// Emit the summary as a structured log event.
    pub fn log(&self) {
        tracing::info!(
            addr = %self.addr,
            issuer = %self.issuer,
            expiration_secs = self.expiration_secs,
            users = ?self.users,
            authn = ?self.authn,
            acl_entries = ?self.acl_entries,
            authz = ?self.authz,
            token_algorithm = self.token_key.algorithm,
            token_key_id = %self.token_key.key_id,
            token_uses_server_identity = self.token_uses_server_identity,
            letsencrypt = self.letsencrypt,
            "Gateway configuration ready"
        );
    }
}

/// Load the configuration at `path` and make it shareable.
pub fn startup(path: &Path) -> Result<SharedConfig, ConfigError> {
    let loaded = load_config(path)?;
    ConfigSummary::new(&loaded).log();
    Ok(SharedConfig::new(loaded))
}
