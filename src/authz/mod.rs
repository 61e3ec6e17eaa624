//! Authorization backend configuration.
//!
//! # Responsibilities
//! - Describe the static ACL and the settings of every authorization backend
//! - Validate each section before the gateway evaluates any rule

pub mod acl;
pub mod mongo;

pub use acl::{validate_acl, Acl, AclEntry, AclError, MatchConditions};
pub use mongo::AclMongoConfig;

use crate::backend::{BackendError, ExtCommandConfig, PluginConfig, Validate};

/// A configured authorization backend, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzBackend {
    Mongo(AclMongoConfig),
    Ext(ExtCommandConfig),
    Plugin(PluginConfig),
}

impl AuthzBackend {
    /// Configuration key the backend is read from.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Mongo(_) => "acl_mongo",
            Self::Ext(_) => "ext_authz",
            Self::Plugin(_) => "plugin_authz",
        }
    }

    /// Dynamically loaded backends are validated after all others.
    pub fn is_plugin(&self) -> bool {
        matches!(self, Self::Plugin(_))
    }

    pub fn validate(&mut self) -> Result<(), BackendError> {
        let key = self.key();
        match self {
            Self::Mongo(c) => c.validate(key),
            Self::Ext(c) => c.validate(key),
            Self::Plugin(c) => c.validate(key),
        }
    }
}
