//! AES-256-GCM transport envelope.
//!
//! Wire form: base64(nonce || ciphertext+tag), 12-byte nonce, no associated
//! data. The scoring engine itself only ever sees plaintext; this module is
//! the boundary where ciphertext stops.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use thiserror::Error;

pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("payload shorter than the 12-byte nonce")]
    TooShort,
    #[error("authenticated decryption failed")]
    Crypt,
    #[error("plaintext is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("envelope key must be 32 bytes after base64 decoding, got {0}")]
    KeyLength(usize),
}

/// A 32-byte AES-256-GCM key, provisioned out of band as base64.
#[derive(Clone)]
pub struct EnvelopeKey(Key<Aes256Gcm>);

impl EnvelopeKey {
    pub fn from_base64(b64: &str) -> Result<Self, EnvelopeError> {
        let bytes = B64.decode(b64.trim())?;
        if bytes.len() != KEY_LEN {
            return Err(EnvelopeError::KeyLength(bytes.len()));
        }
        Ok(Self(Key::<Aes256Gcm>::clone_from_slice(&bytes)))
    }
}

impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.write_str("EnvelopeKey(..)")
    }
}

/// Encrypt a plaintext into the wire form with a fresh random nonce.
pub fn seal(key: &EnvelopeKey, plaintext: &str) -> Result<String, EnvelopeError> {
    let cipher = Aes256Gcm::new(&key.0);
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| EnvelopeError::Crypt)?;

    let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    framed.extend_from_slice(nonce.as_slice());
    framed.extend_from_slice(&ciphertext);
    Ok(B64.encode(framed))
}

/// Decrypt the wire form back to plaintext, authenticating the payload.
pub fn open(key: &EnvelopeKey, payload_b64: &str) -> Result<String, EnvelopeError> {
    let framed = B64.decode(payload_b64.trim())?;
    if framed.len() < NONCE_LEN {
        return Err(EnvelopeError::TooShort);
    }
    let (nonce, ciphertext) = framed.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(&key.0);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| EnvelopeError::Crypt)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Generate a fresh envelope key in the provisioning wire form.
pub fn generate_key_b64() -> String {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    B64.encode(key)
}
