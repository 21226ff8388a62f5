//! Sizes and errors for the payload encrypter.

/// Secret key length (AES-256).
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce length.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length.
pub const TAG_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The OS random source could not produce a nonce.
    #[error("nonce generation failed: {0}")]
    Entropy(#[from] rand::Error),

    /// Sealing failed.
    #[error("encryption failed")]
    Seal,

    /// The input cannot be an envelope (too short or badly encoded).
    #[error("malformed ciphertext: {0}")]
    Malformed(&'static str),

    /// Tag mismatch. Deliberately does not say whether the data was corrupted,
    /// tampered with or sealed under another key.
    #[error("message authentication failed")]
    Authentication,

    /// Authentic plaintext that is not UTF-8 text.
    #[error("decrypted text is not valid UTF-8")]
    InvalidUtf8,
}
