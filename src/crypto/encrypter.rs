//! AES-256-GCM payload encrypter.
//!
//! Envelope layout:
//! ```text
//! nonce (12) ‖ ciphertext (len(plaintext)) ‖ tag (16)
//! ```
//!
//! A fresh nonce is drawn from the OS random source for every message; there
//! is no counter to share, so one encrypter can serve concurrent callers.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce as AesNonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::crypto::types::{CryptoError, KEY_LEN, NONCE_LEN};

/// Encrypts and decrypts opaque payloads under a fixed 32-byte secret.
#[derive(Clone)]
pub struct Encrypter {
    aead: Aes256Gcm,
}

impl Encrypter {
    /// Create an encrypter for `secret`.
    ///
    /// # Panics
    ///
    /// If `secret` is not exactly 32 bytes long. A wrong key size is a
    /// deployment mistake, never something to recover from at runtime.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        assert!(
            secret.len() == KEY_LEN,
            "encrypter secret must be {KEY_LEN} bytes long, got {}",
            secret.len()
        );

        Self {
            aead: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(secret)),
        }
    }

    /// Seal `plaintext` under a fresh random nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.try_fill_bytes(&mut nonce)?;

        let sealed = self
            .aead
            .encrypt(AesNonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::Seal)?;

        let mut envelope = Vec::with_capacity(NONCE_LEN + sealed.len());
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&sealed);
        Ok(envelope)
    }

    /// Open an envelope produced by [`Encrypter::encrypt`].
    pub fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if envelope.len() < NONCE_LEN {
            return Err(CryptoError::Malformed("shorter than nonce"));
        }

        let (nonce, sealed) = envelope.split_at(NONCE_LEN);
        self.aead
            .decrypt(AesNonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::Authentication)
    }

    /// Encrypt UTF-8 text. The envelope is returned as standard base64.
    pub fn encrypt_string(&self, plaintext: &str) -> Result<String, CryptoError> {
        self.encrypt(plaintext.as_bytes())
            .map(|envelope| STANDARD.encode(envelope))
    }

    /// Decrypt a base64 envelope produced by [`Encrypter::encrypt_string`].
    pub fn decrypt_string(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let envelope = STANDARD
            .decode(ciphertext)
            .map_err(|_| CryptoError::Malformed("invalid base64"))?;
        let plaintext = self.decrypt(&envelope)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
    }
}

// Never print key material.
impl fmt::Debug for Encrypter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encrypter")
            .field("cipher", &"AES-256-GCM")
            .finish_non_exhaustive()
    }
}
