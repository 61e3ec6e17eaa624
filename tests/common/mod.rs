//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rcgen::{CertificateParams, KeyPair, SignatureAlgorithm};
use tempfile::TempDir;

/// Paths of a certificate/key pair written to disk.
pub struct PemFiles {
    pub certificate: PathBuf,
    pub key: PathBuf,
}

/// A scratch directory holding a config file and its key material.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a self-signed certificate and its PKCS#8 key as `<name>.pem`
    /// and `<name>.key`.
    pub fn key_pair(&self, name: &str, alg: &'static SignatureAlgorithm) -> PemFiles {
        let key = KeyPair::generate_for(alg).unwrap();
        self.write_pair(name, &key, &key)
    }

    pub fn p256(&self, name: &str) -> PemFiles {
        self.key_pair(name, &rcgen::PKCS_ECDSA_P256_SHA256)
    }

    pub fn p384(&self, name: &str) -> PemFiles {
        self.key_pair(name, &rcgen::PKCS_ECDSA_P384_SHA384)
    }

    pub fn ed25519(&self, name: &str) -> PemFiles {
        self.key_pair(name, &rcgen::PKCS_ED25519)
    }

    /// A certificate whose key file holds an unrelated key of the same type.
    pub fn mismatched_p256(&self, name: &str) -> PemFiles {
        let signing = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
        let other = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
        self.write_pair(name, &signing, &other)
    }

    fn write_pair(&self, name: &str, cert_key: &KeyPair, file_key: &KeyPair) -> PemFiles {
        let params = CertificateParams::new(vec!["registry-auth.test".to_string()]).unwrap();
        let cert = params.self_signed(cert_key).unwrap();

        let files = PemFiles {
            certificate: self.path(&format!("{name}.pem")),
            key: self.path(&format!("{name}.key")),
        };
        fs::write(&files.certificate, cert.pem()).unwrap();
        fs::write(&files.key, file_key.serialize_pem()).unwrap();
        files
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write `auth.yml`.
    pub fn config(&self, contents: &str) -> PathBuf {
        self.write("auth.yml", contents)
    }
}

/// Checked-in key material under `tests/fixtures`, for encodings the
/// certificate generator cannot produce (RSA, SEC1).
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// `server` and `token` sections with optional key material, followed by
/// `rest` verbatim.
pub fn config_yaml(server: Option<&PemFiles>, token: Option<&PemFiles>, rest: &str) -> String {
    let mut yaml = String::from("server:\n  addr: \":5001\"\n");
    if let Some(files) = server {
        yaml.push_str(&pem_lines(files));
    }
    yaml.push_str("token:\n  issuer: \"Acme auth server\"\n  expiration: 900\n");
    if let Some(files) = token {
        yaml.push_str(&pem_lines(files));
    }
    yaml.push_str(rest);
    yaml
}

/// Static users and an allow-all ACL.
pub const ALLOW_ALL: &str = r#"users:
  "admin":
    password: "$2y$05$LO.vzwpWC5LZGqThvEfznu8qhb5SGqvBSWY1J3yZ4AxtMRZ3kN5jC"
acl:
  - match: {account: "admin"}
    actions: ["*"]
    comment: "Admin has full access to everything."
"#;

fn pem_lines(files: &PemFiles) -> String {
    format!(
        "  certificate: {}\n  key: {}\n",
        quoted(&files.certificate),
        quoted(&files.key)
    )
}

fn quoted(path: &Path) -> String {
    format!("{:?}", path.display().to_string())
}
