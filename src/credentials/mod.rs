//! Token signing and verification key material.
//!
//! # Data Flow
//! ```text
//! certificate.pem + key.pem
//!     → keys.rs (PEM decode, leaf parse, key type check, pair check)
//!     → KeyPair (public: verification, private: signing)
//!     → Credentials (server identity, token identity)
//! ```
//!
//! # Design Decisions
//! - Key material is derived by the loader and kept beside the
//!   configuration, never written into the deserialized structs
//! - A token identity that falls back to the server identity shares the
//!   same `Arc<KeyPair>`

pub mod key_id;
pub mod keys;

use std::sync::Arc;

pub use keys::{load_cert_and_key, CredentialError, KeyAlgorithm, KeyPair, PrivateKey, PublicKey};

/// Key pairs resolved while loading a configuration.
#[derive(Debug, Clone)]
pub struct Credentials {
    server: Option<Arc<KeyPair>>,
    token: Arc<KeyPair>,
}

impl Credentials {
    pub fn new(server: Option<Arc<KeyPair>>, token: Arc<KeyPair>) -> Self {
        Self { server, token }
    }

    /// TLS identity of the listener, when configured from files.
    pub fn server(&self) -> Option<&Arc<KeyPair>> {
        self.server.as_ref()
    }

    /// Identity used to sign issued tokens.
    pub fn token(&self) -> &Arc<KeyPair> {
        &self.token
    }

    /// Whether tokens are signed with the listener's own key pair.
    pub fn token_uses_server_identity(&self) -> bool {
        self.server
            .as_ref()
            .is_some_and(|server| Arc::ptr_eq(server, &self.token))
    }
}
