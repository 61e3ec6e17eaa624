//! Static user table (`users`).

use std::collections::BTreeMap;

use serde::Deserialize;

/// Username → requirements. An empty table denies everyone.
pub type Users = BTreeMap<String, Option<Requirements>>;

/// What a statically configured user must present, and the labels they get.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct Requirements {
    /// bcrypt hash of the password. No password means any password is accepted.
    pub password: Option<String>,

    /// Labels attached to the user's tokens and matched by ACL rules.
    pub labels: BTreeMap<String, Vec<String>>,
}
