//! Directory service backend settings (`ldap_auth`).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::backend::{read_secret_file, BackendError, Validate};

/// How the connection to the directory is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LdapTls {
    #[default]
    Always,
    Never,
    StartTls,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct LdapAuthConfig {
    /// `host:port` of the directory server.
    pub addr: String,

    pub tls: LdapTls,

    pub insecure_tls_skip_verify: bool,

    /// PEM bundle trusted for the directory's certificate.
    pub ca_certificate: Option<PathBuf>,

    /// Search base for user lookups.
    pub base: String,

    /// Search filter; `${account}` is replaced with the user name.
    pub filter: String,

    pub bind_dn: String,

    /// File holding the bind password.
    pub bind_password_file: Option<PathBuf>,

    /// Populated from `bind_password_file` during validation.
    #[serde(skip)]
    pub bind_password: String,

    /// Directory attribute → token label mappings.
    pub labels: BTreeMap<String, LabelMap>,

    pub group_base_dn: String,

    pub group_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct LabelMap {
    pub attribute: String,
    pub parse_cn: bool,
    pub lower_case: bool,
}

impl Validate for LdapAuthConfig {
    fn validate(&mut self, key: &str) -> Result<(), BackendError> {
        if self.addr.is_empty() {
            return Err(BackendError::MissingField(format!("{key}.addr")));
        }
        if self.base.is_empty() {
            return Err(BackendError::MissingField(format!("{key}.base")));
        }
        if let Some(path) = &self.bind_password_file {
            self.bind_password = read_secret_file(path)?;
        }
        Ok(())
    }
}
