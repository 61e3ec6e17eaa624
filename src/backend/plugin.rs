//! Shared-object plugin backends (`plugin_authn`, `plugin_authz`).

use std::path::PathBuf;

use serde::Deserialize;

use crate::backend::{BackendError, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginConfig {
    /// Path to the plugin shared object.
    #[serde(default)]
    pub plugin_path: PathBuf,
}

impl Validate for PluginConfig {
    fn validate(&mut self, key: &str) -> Result<(), BackendError> {
        if self.plugin_path.as_os_str().is_empty() {
            return Err(BackendError::MissingField(format!("{key}.plugin_path")));
        }
        match self.plugin_path.metadata() {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(BackendError::invalid(
                format!("{key}.plugin_path"),
                format!("{} is not a file", self.plugin_path.display()),
            )),
            Err(e) => Err(BackendError::invalid(
                format!("{key}.plugin_path"),
                format!("{}: {e}", self.plugin_path.display()),
            )),
        }
    }
}
