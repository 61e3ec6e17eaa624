//! External command backends (`ext_auth`, `ext_authz`).

use serde::Deserialize;

use crate::backend::{BackendError, Validate};

/// An external program consulted for each decision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtCommandConfig {
    /// Program to run, either a path or a name looked up in `PATH`.
    #[serde(default)]
    pub command: String,

    /// Extra arguments passed before the request data.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Validate for ExtCommandConfig {
    fn validate(&mut self, key: &str) -> Result<(), BackendError> {
        if self.command.is_empty() {
            return Err(BackendError::MissingField(format!("{key}.command")));
        }
        which::which(&self.command).map_err(|e| {
            BackendError::invalid(
                format!("{key}.command"),
                format!("invalid command {:?}: {e}", self.command),
            )
        })?;
        Ok(())
    }
}
