//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require an authentication and an authorization mechanism
//! - Delegate each backend section to its own `validate`
//! - Inject backend defaults and resolve secret files
//!
//! # Design Decisions
//! - Returns the first violated invariant, checks run in a fixed order
//! - An empty `users` table or `acl` list is an explicit deny-all and is
//!   accepted; a missing one is treated as a mistake
//! - Runs before any certificate or key file is touched

use std::path::PathBuf;

use crate::authn::AuthnBackend;
use crate::authz::{validate_acl, AclError, AuthzBackend};
use crate::backend::BackendError;
use crate::config::schema::Config;

/// A configuration invariant was violated.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("server.addr is required")]
    MissingListenAddress,

    #[error("server.path_prefix must be an absolute path, got {0:?}")]
    RelativePathPrefix(String),

    #[error("token.issuer is required")]
    MissingIssuer,

    #[error("token.expiration must be positive, got {0}")]
    NonPositiveExpiration(i64),

    #[error(
        "no auth methods are configured, this is probably a mistake. \
         Use an empty user map if you really want to deny everyone"
    )]
    NoAuthnMethods,

    #[error(
        "ACL is empty, this is probably a mistake. \
         Use an empty list if you really want to deny all actions"
    )]
    NoAuthzMethods,

    #[error("invalid ACL: {0}")]
    Acl(#[from] AclError),

    #[error("bad {key} config: {source}")]
    Backend {
        key: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("failed to load {section} cert and key: both were not provided")]
    PartialKeyPair { section: &'static str },

    #[error("failed to load token cert and key: none provided")]
    NoTokenIdentity,

    #[error("server.letsencrypt.cache_dir is required")]
    MissingLetsEncryptCacheDir,

    #[error("server.letsencrypt.cache_dir ({}) does not exist or is not a directory", .0.display())]
    LetsEncryptCacheDirNotDirectory(PathBuf),
}

/// Validate `config` in place.
///
/// Backend defaults and secrets read from files are written back into
/// `config`, so a successful call leaves no zero-valued operational setting.
pub fn validate_config(config: &mut Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_token(config)?;

    if !config.has_authn() {
        return Err(ValidationError::NoAuthnMethods);
    }
    for backend in config.authn.iter_mut().filter(|b| !b.is_plugin()) {
        validate_authn(backend)?;
    }

    if !config.has_authz() {
        return Err(ValidationError::NoAuthzMethods);
    }
    if let Some(acl) = &config.acl {
        validate_acl(acl)?;
    }
    for backend in config.authz.iter_mut().filter(|b| !b.is_plugin()) {
        validate_authz(backend)?;
    }

    // Plugins are checked after every declarative section.
    for backend in config.authn.iter_mut().filter(|b| b.is_plugin()) {
        validate_authn(backend)?;
    }
    for backend in config.authz.iter_mut().filter(|b| b.is_plugin()) {
        validate_authz(backend)?;
    }

    Ok(())
}

fn validate_authn(backend: &mut AuthnBackend) -> Result<(), ValidationError> {
    let key = backend.key();
    backend
        .validate()
        .map_err(|source| ValidationError::Backend { key, source })
}

fn validate_authz(backend: &mut AuthzBackend) -> Result<(), ValidationError> {
    let key = backend.key();
    backend
        .validate()
        .map_err(|source| ValidationError::Backend { key, source })
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    let server = &config.server;
    if server.listen_address.is_empty() {
        return Err(ValidationError::MissingListenAddress);
    }
    if let Some(prefix) = &server.path_prefix {
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ValidationError::RelativePathPrefix(prefix.clone()));
        }
    }
    Ok(())
}

fn validate_token(config: &Config) -> Result<(), ValidationError> {
    if config.token.issuer.is_empty() {
        return Err(ValidationError::MissingIssuer);
    }
    if config.token.expiration <= 0 {
        return Err(ValidationError::NonPositiveExpiration(config.token.expiration));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authn::{GoogleAuthConfig, Users};
    use crate::authz::AclEntry;
    use crate::backend::PluginConfig;

    fn minimal() -> Config {
        let mut config = Config::default();
        config.server.listen_address = ":5001".into();
        config.token.issuer = "Acme auth".into();
        config.token.expiration = 900;
        config.users = Some(Users::new());
        config.acl = Some(Vec::new());
        config
    }

    #[test]
    fn test_minimal_is_valid() {
        assert!(validate_config(&mut minimal()).is_ok());
    }

    #[test]
    fn test_listen_address_required() {
        let mut config = minimal();
        config.server.listen_address.clear();
        assert!(matches!(
            validate_config(&mut config),
            Err(ValidationError::MissingListenAddress)
        ));
    }

    #[test]
    fn test_path_prefix_must_be_absolute() {
        let mut config = minimal();
        config.server.path_prefix = Some("auth".into());
        assert!(matches!(
            validate_config(&mut config),
            Err(ValidationError::RelativePathPrefix(_))
        ));

        config.server.path_prefix = Some("/auth".into());
        assert!(validate_config(&mut config).is_ok());
    }

    #[test]
    fn test_issuer_required() {
        let mut config = minimal();
        config.token.issuer.clear();
        assert!(matches!(
            validate_config(&mut config),
            Err(ValidationError::MissingIssuer)
        ));
    }

    #[test]
    fn test_expiration_must_be_positive() {
        for expiration in [0, -5] {
            let mut config = minimal();
            config.token.expiration = expiration;
            let err = validate_config(&mut config).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("token.expiration must be positive, got {expiration}")
            );
        }
    }

    #[test]
    fn test_first_failure_wins() {
        let mut config = minimal();
        config.server.listen_address.clear();
        config.token.issuer.clear();
        config.users = None;
        assert!(matches!(
            validate_config(&mut config),
            Err(ValidationError::MissingListenAddress)
        ));
    }

    #[test]
    fn test_authn_required() {
        let mut config = minimal();
        config.users = None;
        assert!(matches!(
            validate_config(&mut config),
            Err(ValidationError::NoAuthnMethods)
        ));
    }

    #[test]
    fn test_authz_required() {
        let mut config = minimal();
        config.acl = None;
        assert!(matches!(
            validate_config(&mut config),
            Err(ValidationError::NoAuthzMethods)
        ));
    }

    #[test]
    fn test_backend_errors_carry_key() {
        let mut config = minimal();
        config.users = None;
        config.authn.push(AuthnBackend::Google(GoogleAuthConfig::default()));

        let err = validate_config(&mut config).unwrap_err();
        assert!(matches!(err, ValidationError::Backend { key: "google_auth", .. }));
        assert!(err.to_string().starts_with("bad google_auth config: "));
    }

    #[test]
    fn test_authz_backend_satisfies_requirement() {
        let mut config = minimal();
        config.acl = None;
        config.authz.push(AuthzBackend::Plugin(PluginConfig {
            plugin_path: "/nonexistent/authz.so".into(),
        }));

        let err = validate_config(&mut config).unwrap_err();
        assert!(matches!(err, ValidationError::Backend { key: "plugin_authz", .. }));
    }

    #[test]
    fn test_acl_errors_wrapped() {
        let mut config = minimal();
        config.acl = Some(vec![AclEntry::default()]);
        let err = validate_config(&mut config).unwrap_err();
        assert_eq!(err.to_string(), "invalid ACL: entry 0: match is required");
    }

    #[test]
    fn test_defaults_written_back() {
        let mut config = minimal();
        config.authn.push(AuthnBackend::Google(GoogleAuthConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            token_db: "/tmp/tokens.ldb".into(),
            ..Default::default()
        }));
        validate_config(&mut config).unwrap();

        match &config.authn[0] {
            AuthnBackend::Google(google) => assert_eq!(google.http_timeout, 10),
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[test]
    fn test_plugin_authn_checked_after_authz_presence() {
        let mut config = minimal();
        config.acl = None;
        config.authn.push(AuthnBackend::Plugin(PluginConfig {
            plugin_path: "/nonexistent/authn.so".into(),
        }));

        assert!(matches!(
            validate_config(&mut config),
            Err(ValidationError::NoAuthzMethods)
        ));
    }

    #[test]
    fn test_plugin_authn_checked_after_authz_backends() {
        let mut config = minimal();
        config.authn.push(AuthnBackend::Plugin(PluginConfig {
            plugin_path: "/nonexistent/authn.so".into(),
        }));
        config.authz.push(AuthzBackend::Plugin(PluginConfig {
            plugin_path: "/nonexistent/authz.so".into(),
        }));

        let err = validate_config(&mut config).unwrap_err();
        assert!(matches!(err, ValidationError::Backend { key: "plugin_authn", .. }));
    }

    #[test]
    fn test_mongo_auth_checked_before_google() {
        let mut config: Config = serde_yaml::from_str(
            r#"
server: {addr: ":5001"}
token: {issuer: "Acme auth", expiration: 900}
google_auth: {client_id: y}
mongo_auth: {collection: users}
acl: []
"#,
        )
        .unwrap();

        let err = validate_config(&mut config).unwrap_err();
        assert!(matches!(err, ValidationError::Backend { key: "mongo_auth", .. }));
        assert!(err.to_string().contains("mongo_auth.dial_info.addrs"));
    }
}
