//! Configuration loading from disk.
//!
//! Loading is a fixed pipeline; the first failing step rejects the whole
//! configuration:
//!
//! ```text
//! Unread → Read → Parsed → FieldValidated → ServerKeysResolved
//!        → TokenKeysResolved → Ready
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::schema::{Config, KeyFiles, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::credentials::{load_cert_and_key, CredentialError, Credentials, KeyPair};

/// Which identity a certificate/key pair is loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Server,
    Token,
}

impl Identity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Token => "token",
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid config: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to load {identity} cert and key: {source}")]
    Credentials {
        identity: Identity,
        #[source]
        source: CredentialError,
    },
}

/// A validated configuration together with the key material it names.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub credentials: Credentials,
}

/// Load, validate and provision a configuration file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    tracing::debug!(path = %path.display(), "Reading configuration");
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = load_config_from_str(&contents, ConfigFormat::from_path(path))?;

    tracing::info!(
        path = %path.display(),
        addr = %loaded.config.server.listen_address,
        issuer = %loaded.config.token.issuer,
        token_key_id = %loaded.credentials.token().key_id(),
        "Configuration loaded"
    );
    Ok(loaded)
}

/// Run every step after reading on an in-memory document.
///
/// Relative certificate, key and secret paths resolve against the process
/// working directory.
pub fn load_config_from_str(contents: &str, format: ConfigFormat) -> Result<LoadedConfig, ConfigError> {
    let mut config = parse(contents, format)?;
    validate_config(&mut config)?;
    let credentials = resolve_credentials(&config)?;
    check_letsencrypt(&config.server, credentials.server().is_some())?;
    Ok(LoadedConfig {
        config,
        credentials,
    })
}

fn parse(contents: &str, format: ConfigFormat) -> Result<Config, ParseError> {
    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
        ConfigFormat::Toml => toml::from_str(contents)?,
    };
    Ok(config)
}

/// Load the server and token identities, applying the fallback rule.
fn resolve_credentials(config: &Config) -> Result<Credentials, ConfigError> {
    let server = load_identity(Identity::Server, config.server.key_files())?;
    let token = load_identity(Identity::Token, config.token.key_files())?;

    let token = match (token, &server) {
        (Some(token), _) => token,
        (None, Some(server)) => {
            tracing::info!("No token certificate configured, signing tokens with the server key pair");
            Arc::clone(server)
        }
        (None, None) => return Err(ValidationError::NoTokenIdentity.into()),
    };
    Ok(Credentials::new(server, token))
}

fn load_identity(identity: Identity, files: KeyFiles<'_>) -> Result<Option<Arc<KeyPair>>, ConfigError> {
    match files {
        KeyFiles::None => Ok(None),
        KeyFiles::Partial => Err(ValidationError::PartialKeyPair {
            section: identity.as_str(),
        }
        .into()),
        KeyFiles::Both { certificate, key } => load_cert_and_key(certificate, key)
            .map(|pair| Some(Arc::new(pair)))
            .map_err(|source| ConfigError::Credentials { identity, source }),
    }
}

/// The certificate cache must already exist: creating it on a mistyped path
/// would silently lose previously acquired certificates.
fn check_letsencrypt(server: &ServerConfig, server_identity_configured: bool) -> Result<(), ValidationError> {
    let le = &server.letsencrypt;
    if server_identity_configured || le.email.is_empty() {
        return Ok(());
    }
    let cache_dir = le
        .cache_dir
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ValidationError::MissingLetsEncryptCacheDir)?;

    match fs::metadata(cache_dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(ValidationError::LetsEncryptCacheDirNotDirectory(cache_dir.to_path_buf())),
    }
}
