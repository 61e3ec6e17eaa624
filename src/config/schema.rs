//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure of the gateway.
//! Backend sections are optional top-level keys on disk; in memory they are
//! collected into tagged lists so "nothing configured" is a single check.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::authn::{
    AuthnBackend, GitHubAuthConfig, GoogleAuthConfig, LdapAuthConfig, MongoAuthConfig, Users,
};
use crate::authz::{Acl, AclMongoConfig, AuthzBackend};
use crate::backend::{ExtCommandConfig, PluginConfig};

/// Root configuration for the gateway.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawConfig")]
pub struct Config {
    /// Listener settings (address, TLS, proxy headers).
    pub server: ServerConfig,

    /// Parameters of issued tokens.
    pub token: TokenConfig,

    /// Static user table. `Some` with no entries denies everyone.
    pub users: Option<Users>,

    /// Authentication backends in canonical key order.
    pub authn: Vec<AuthnBackend>,

    /// Static access-control list. `Some` with no entries denies everything.
    pub acl: Option<Acl>,

    /// Authorization backends in canonical key order.
    pub authz: Vec<AuthzBackend>,
}

impl Config {
    /// Whether any authentication mechanism is declared, even an empty one.
    pub fn has_authn(&self) -> bool {
        self.users.is_some() || !self.authn.is_empty()
    }

    /// Whether any authorization mechanism is declared, even an empty one.
    pub fn has_authz(&self) -> bool {
        self.acl.is_some() || !self.authz.is_empty()
    }
}

/// On-disk layout: one optional key per backend.
///
/// Unknown keys are accepted so documents carrying settings for other
/// deployments keep loading; top-level ones are reported.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    token: TokenConfig,
    users: Option<Users>,
    google_auth: Option<GoogleAuthConfig>,
    github_auth: Option<GitHubAuthConfig>,
    ldap_auth: Option<LdapAuthConfig>,
    mongo_auth: Option<MongoAuthConfig>,
    ext_auth: Option<ExtCommandConfig>,
    plugin_authn: Option<PluginConfig>,
    acl: Option<Acl>,
    acl_mongo: Option<AclMongoConfig>,
    ext_authz: Option<ExtCommandConfig>,
    plugin_authz: Option<PluginConfig>,
    #[serde(flatten)]
    unknown: BTreeMap<String, IgnoredAny>,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        for key in raw.unknown.keys() {
            tracing::warn!(key = %key, "Ignoring unknown configuration key");
        }

        let authn = [
            raw.mongo_auth.map(AuthnBackend::Mongo),
            raw.google_auth.map(AuthnBackend::Google),
            raw.github_auth.map(AuthnBackend::GitHub),
            raw.ldap_auth.map(AuthnBackend::Ldap),
            raw.ext_auth.map(AuthnBackend::Ext),
            raw.plugin_authn.map(AuthnBackend::Plugin),
        ];
        let authz = [
            raw.acl_mongo.map(AuthzBackend::Mongo),
            raw.ext_authz.map(AuthzBackend::Ext),
            raw.plugin_authz.map(AuthzBackend::Plugin),
        ];

        Self {
            server: raw.server,
            token: raw.token,
            users: raw.users,
            authn: authn.into_iter().flatten().collect(),
            acl: raw.acl,
            authz: authz.into_iter().flatten().collect(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., ":5001", "0.0.0.0:5001").
    #[serde(rename = "addr")]
    pub listen_address: String,

    /// URL prefix the gateway is mounted under (e.g., "/auth").
    pub path_prefix: Option<String>,

    /// Header carrying the client address when behind a reverse proxy.
    pub real_ip_header: Option<String>,

    /// Position within a comma-separated `real_ip_header`; negative values
    /// count from the end.
    pub real_ip_pos: i32,

    /// Path to certificate file (PEM).
    pub certificate: Option<PathBuf>,

    /// Path to private key file (PEM).
    pub key: Option<PathBuf>,

    /// Automatic certificate acquisition.
    pub letsencrypt: LetsEncryptConfig,
}

impl ServerConfig {
    pub fn key_files(&self) -> KeyFiles<'_> {
        KeyFiles::from_paths(self.certificate.as_deref(), self.key.as_deref())
    }
}

/// Automatic certificate acquisition settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LetsEncryptConfig {
    /// Host name certificates are requested for.
    pub host: String,

    /// Contact address; acquisition is enabled when set.
    pub email: String,

    /// Existing directory where acquired certificates are kept.
    pub cache_dir: Option<PathBuf>,
}

/// Parameters of the tokens this gateway issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// `iss` claim; must match the registry's configured issuer.
    pub issuer: String,

    /// Path to certificate file (PEM).
    pub certificate: Option<PathBuf>,

    /// Path to private key file (PEM).
    pub key: Option<PathBuf>,

    /// Token lifetime in seconds.
    pub expiration: i64,
}

impl TokenConfig {
    pub fn key_files(&self) -> KeyFiles<'_> {
        KeyFiles::from_paths(self.certificate.as_deref(), self.key.as_deref())
    }
}

/// Which of a section's certificate/key paths are set. Empty paths count
/// as unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFiles<'a> {
    None,
    Partial,
    Both { certificate: &'a Path, key: &'a Path },
}

impl<'a> KeyFiles<'a> {
    fn from_paths(certificate: Option<&'a Path>, key: Option<&'a Path>) -> Self {
        let set = |p: Option<&'a Path>| p.filter(|p| !p.as_os_str().is_empty());
        match (set(certificate), set(key)) {
            (None, None) => Self::None,
            (Some(certificate), Some(key)) => Self::Both { certificate, key },
            _ => Self::Partial,
        }
    }
}
