//! MongoDB-backed ACL settings (`acl_mongo`).

use std::time::Duration;

use serde::Deserialize;

use crate::backend::{BackendError, MongoConfig, Validate};

/// How long fetched rules are cached when `cache_ttl` is unset.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct AclMongoConfig {
    #[serde(flatten)]
    pub mongo: MongoConfig,

    /// Collection holding ACL entries.
    pub collection: String,

    /// How long fetched rules are reused. An explicit zero disables caching.
    #[serde(deserialize_with = "crate::backend::duration::deserialize")]
    pub cache_ttl: Option<Duration>,
}

impl Validate for AclMongoConfig {
    fn validate(&mut self, key: &str) -> Result<(), BackendError> {
        if self.collection.is_empty() {
            return Err(BackendError::MissingField(format!("{key}.collection")));
        }
        self.mongo.validate(key)?;
        self.cache_ttl.get_or_insert(DEFAULT_CACHE_TTL);
        Ok(())
    }
}
