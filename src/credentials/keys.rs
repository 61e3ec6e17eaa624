//! Certificate and private key loading.
//!
//! # Responsibilities
//! - Read a PEM certificate and a PEM private key from disk
//! - Derive the verification key from the leaf certificate
//! - Derive the signing key from the private key
//! - Reject key types that cannot sign tokens and pairs that do not match

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use p256::pkcs8::EncodePrivateKey;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey as SpkiKey;

use crate::credentials::key_id::key_id;

/// Message signed and verified to prove a certificate and key belong together.
const PAIR_PROBE: &[u8] = b"registry-auth key pair probe";

/// Errors raised while loading a certificate/key pair.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("could not read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no certificate found in {}", .0.display())]
    NoCertificate(PathBuf),

    #[error("no private key found in {}", .0.display())]
    NoPrivateKey(PathBuf),

    #[error("invalid certificate: {0}")]
    Certificate(String),

    #[error("invalid private key: {0}")]
    PrivateKey(String),

    #[error("unsupported key type for signing: {0}")]
    UnsupportedKeyType(String),

    #[error("private key does not match the certificate: {0}")]
    KeyMismatch(String),
}

/// Token signing algorithm implied by a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-256.
    Rs256,
    /// ECDSA on P-256 with SHA-256.
    Es256,
    /// ECDSA on P-384 with SHA-384.
    Es384,
}

impl KeyAlgorithm {
    fn from_spki(spki: &SubjectPublicKeyInfo<'_>) -> Result<Self, CredentialError> {
        match spki.parsed() {
            Ok(SpkiKey::RSA(_)) => Ok(Self::Rs256),
            Ok(SpkiKey::EC(point)) => match point.key_size() {
                256 => Ok(Self::Es256),
                384 => Ok(Self::Es384),
                bits => Err(CredentialError::UnsupportedKeyType(format!(
                    "EC key on a {bits}-bit curve"
                ))),
            },
            _ => Err(CredentialError::UnsupportedKeyType(format!(
                "public key algorithm {}",
                spki.algorithm.algorithm
            ))),
        }
    }

    /// Name used in the `alg` header of issued tokens.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
        }
    }
}

impl From<KeyAlgorithm> for Algorithm {
    fn from(alg: KeyAlgorithm) -> Self {
        match alg {
            KeyAlgorithm::Rs256 => Algorithm::RS256,
            KeyAlgorithm::Es256 => Algorithm::ES256,
            KeyAlgorithm::Es384 => Algorithm::ES384,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification half of a token identity, derived from a certificate.
#[derive(Clone)]
pub struct PublicKey {
    algorithm: KeyAlgorithm,
    spki_der: Vec<u8>,
    key_id: String,
    decoding: DecodingKey,
}

impl PublicKey {
    /// Derive the public key from a DER-encoded X.509 certificate.
    pub fn from_certificate(der: &[u8]) -> Result<Self, CredentialError> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| CredentialError::Certificate(e.to_string()))?;
        let spki = cert.public_key();
        let algorithm = KeyAlgorithm::from_spki(spki)?;

        // The subjectPublicKey bit string is a PKCS#1 RSAPublicKey for RSA
        // and an uncompressed SEC1 point for EC.
        let key_bits: &[u8] = &spki.subject_public_key.data;
        let decoding = match algorithm {
            KeyAlgorithm::Rs256 => DecodingKey::from_rsa_der(key_bits),
            KeyAlgorithm::Es256 | KeyAlgorithm::Es384 => DecodingKey::from_ec_der(key_bits),
        };

        Ok(Self {
            algorithm,
            spki_der: spki.raw.to_vec(),
            key_id: key_id(spki.raw),
            decoding,
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Registry-style key identifier, used as the token `kid`.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// DER-encoded SubjectPublicKeyInfo.
    pub fn spki_der(&self) -> &[u8] {
        &self.spki_der
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Check a signature produced by the matching private key.
    pub fn verify(&self, signature: &str, message: &[u8]) -> bool {
        jsonwebtoken::crypto::verify(signature, message, &self.decoding, self.algorithm.into())
            .unwrap_or(false)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.spki_der == other.spki_der
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .finish()
    }
}

/// Signing half of a token identity.
#[derive(Clone)]
pub struct PrivateKey {
    algorithm: KeyAlgorithm,
    encoding: EncodingKey,
}

impl PrivateKey {
    /// Build the signing key for `algorithm` from a PEM key file.
    ///
    /// `der` is the key block already located in `pem`. SEC1 EC keys are
    /// re-encoded as PKCS#8, the only EC encoding the signer accepts.
    pub fn from_pem(
        algorithm: KeyAlgorithm,
        der: &PrivateKeyDer<'_>,
        pem: &[u8],
    ) -> Result<Self, CredentialError> {
        let encoding = match (algorithm, der) {
            (KeyAlgorithm::Es256 | KeyAlgorithm::Es384, PrivateKeyDer::Pkcs1(_)) => {
                return Err(CredentialError::KeyMismatch(
                    "certificate holds an EC key but the key file holds an RSA key".to_string(),
                ))
            }
            (_, PrivateKeyDer::Sec1(sec1)) => {
                let pkcs8 = sec1_to_pkcs8(algorithm, sec1.secret_sec1_der())?;
                EncodingKey::from_ec_der(&pkcs8)
            }
            (KeyAlgorithm::Rs256, _) => EncodingKey::from_rsa_pem(pem)
                .map_err(|e| CredentialError::PrivateKey(e.to_string()))?,
            (KeyAlgorithm::Es256 | KeyAlgorithm::Es384, _) => EncodingKey::from_ec_pem(pem)
                .map_err(|e| CredentialError::PrivateKey(e.to_string()))?,
        };

        Ok(Self {
            algorithm,
            encoding,
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    /// Sign `message`, returning the base64url signature.
    pub fn sign(&self, message: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
        jsonwebtoken::crypto::sign(message, &self.encoding, self.algorithm.into())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// A matched public/private key pair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Pair the two halves, proving they match by a sign/verify round.
    pub fn new(public: PublicKey, private: PrivateKey) -> Result<Self, CredentialError> {
        let signature = private
            .sign(PAIR_PROBE)
            .map_err(|e| CredentialError::KeyMismatch(e.to_string()))?;
        if !public.verify(&signature, PAIR_PROBE) {
            return Err(CredentialError::KeyMismatch(
                "signature made with the private key does not verify against the certificate"
                    .to_string(),
            ));
        }
        Ok(Self { public, private })
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.public.algorithm
    }

    pub fn key_id(&self) -> &str {
        self.public.key_id()
    }
}

/// Load a PEM certificate/private key pair.
///
/// The first certificate in `cert_file` is the leaf; its public key must
/// match the private key in `key_file`.
pub fn load_cert_and_key(cert_file: &Path, key_file: &Path) -> Result<KeyPair, CredentialError> {
    let cert_pem = read_file(cert_file)?;
    let key_pem = read_file(key_file)?;

    let leaf = leaf_certificate(cert_file, &cert_pem)?;
    let key_der = private_key(key_file, &key_pem)?;

    let public = PublicKey::from_certificate(&leaf)?;
    let private = PrivateKey::from_pem(public.algorithm(), &key_der, &key_pem)?;
    let pair = KeyPair::new(public, private)?;

    tracing::debug!(
        certificate = %cert_file.display(),
        key = %key_file.display(),
        algorithm = %pair.algorithm(),
        key_id = %pair.key_id(),
        "Loaded key pair"
    );
    Ok(pair)
}

fn read_file(path: &Path) -> Result<Vec<u8>, CredentialError> {
    fs::read(path).map_err(|source| CredentialError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn leaf_certificate(path: &Path, pem: &[u8]) -> Result<CertificateDer<'static>, CredentialError> {
    let mut reader = pem;
    let first = rustls_pemfile::certs(&mut reader).next();
    match first {
        Some(Ok(cert)) => Ok(cert),
        Some(Err(e)) => Err(CredentialError::Certificate(format!(
            "{}: {e}",
            path.display()
        ))),
        None => Err(CredentialError::NoCertificate(path.to_path_buf())),
    }
}

/// Re-encode a SEC1 `EC PRIVATE KEY` as PKCS#8 DER.
fn sec1_to_pkcs8(algorithm: KeyAlgorithm, sec1: &[u8]) -> Result<Vec<u8>, CredentialError> {
    let invalid = |e: &dyn fmt::Display| CredentialError::PrivateKey(format!("SEC1 key: {e}"));
    let document = match algorithm {
        KeyAlgorithm::Es256 => p256::SecretKey::from_sec1_der(sec1)
            .map_err(|e| invalid(&e))?
            .to_pkcs8_der(),
        KeyAlgorithm::Es384 => p384::SecretKey::from_sec1_der(sec1)
            .map_err(|e| invalid(&e))?
            .to_pkcs8_der(),
        KeyAlgorithm::Rs256 => {
            return Err(CredentialError::KeyMismatch(
                "certificate holds an RSA key but the key file holds an EC key".to_string(),
            ))
        }
    }
    .map_err(|e| invalid(&e))?;
    Ok(document.as_bytes().to_vec())
}

fn private_key(path: &Path, pem: &[u8]) -> Result<PrivateKeyDer<'static>, CredentialError> {
    let mut reader = pem;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| CredentialError::PrivateKey(format!("{}: {e}", path.display())))?
        .ok_or_else(|| CredentialError::NoPrivateKey(path.to_path_buf()))
}
