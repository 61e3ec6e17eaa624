//! Authentication backend configuration.
//!
//! # Responsibilities
//! - Describe the settings of every authentication backend
//! - Validate each section and inject its operational defaults
//!
//! The backends themselves run elsewhere; this module only knows their
//! configuration surface.

pub mod github;
pub mod google;
pub mod ldap;
pub mod mongo;
pub mod users;

pub use github::{GcsStoreConfig, GitHubAuthConfig, TokenStore};
pub use google::GoogleAuthConfig;
pub use ldap::{LdapAuthConfig, LdapTls};
pub use mongo::MongoAuthConfig;
pub use users::{Requirements, Users};

use crate::backend::{BackendError, ExtCommandConfig, PluginConfig, Validate};

/// A configured authentication backend, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthnBackend {
    Google(GoogleAuthConfig),
    GitHub(GitHubAuthConfig),
    Ldap(LdapAuthConfig),
    Mongo(MongoAuthConfig),
    Ext(ExtCommandConfig),
    Plugin(PluginConfig),
}

impl AuthnBackend {
    /// Configuration key the backend is read from.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Google(_) => "google_auth",
            Self::GitHub(_) => "github_auth",
            Self::Ldap(_) => "ldap_auth",
            Self::Mongo(_) => "mongo_auth",
            Self::Ext(_) => "ext_auth",
            Self::Plugin(_) => "plugin_authn",
        }
    }

    /// Dynamically loaded backends are validated after all others.
    pub fn is_plugin(&self) -> bool {
        matches!(self, Self::Plugin(_))
    }

    pub fn validate(&mut self) -> Result<(), BackendError> {
        let key = self.key();
        match self {
            Self::Google(c) => c.validate(key),
            Self::GitHub(c) => c.validate(key),
            Self::Ldap(c) => c.validate(key),
            Self::Mongo(c) => c.validate(key),
            Self::Ext(c) => c.validate(key),
            Self::Plugin(c) => c.validate(key),
        }
    }
}
