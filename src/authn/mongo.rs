//! MongoDB-backed user store settings (`mongo_auth`).

use serde::Deserialize;

use crate::backend::{BackendError, MongoConfig, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct MongoAuthConfig {
    #[serde(flatten)]
    pub mongo: MongoConfig,

    /// Collection holding user documents.
    pub collection: String,
}

impl Validate for MongoAuthConfig {
    fn validate(&mut self, key: &str) -> Result<(), BackendError> {
        if self.collection.is_empty() {
            return Err(BackendError::MissingField(format!("{key}.collection")));
        }
        self.mongo.validate(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_checked_first() {
        let mut cfg = MongoAuthConfig::default();
        assert_eq!(
            cfg.validate("mongo_auth").unwrap_err().to_string(),
            "mongo_auth.collection is required"
        );

        cfg.collection = "users".into();
        assert_eq!(
            cfg.validate("mongo_auth").unwrap_err().to_string(),
            "mongo_auth.dial_info.addrs is required"
        );
    }

    #[test]
    fn test_parses_flattened_connection() {
        let cfg: MongoAuthConfig = serde_yaml::from_str(
            "dial_info:\n  addrs: [\"db1:27017\"]\n  timeout: 3s\ncollection: users\n",
        )
        .unwrap();
        assert_eq!(cfg.mongo.dial_info.addrs, vec!["db1:27017".to_string()]);
        assert_eq!(cfg.collection, "users");
    }
}
