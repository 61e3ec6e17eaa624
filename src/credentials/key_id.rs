//! Registry key identifiers.
//!
//! Token consumers locate the verification key through the `kid` header.
//! The identifier is the SHA-256 digest of the DER-encoded
//! SubjectPublicKeyInfo, truncated to 240 bits, base32 encoded and split
//! into twelve colon-separated groups of four characters.

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha256};

/// Number of digest bytes kept (240 bits).
const TRUNCATED_LEN: usize = 30;

/// Compute the key identifier for a DER-encoded SubjectPublicKeyInfo.
pub fn key_id(spki_der: &[u8]) -> String {
    let digest = Sha256::digest(spki_der);
    let encoded = BASE32_NOPAD.encode(&digest[..TRUNCATED_LEN]);

    let mut id = String::with_capacity(encoded.len() + encoded.len() / 4);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            id.push(':');
        }
        id.push(c);
    }
    id
}
