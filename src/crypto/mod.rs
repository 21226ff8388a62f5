//! Authenticated encryption for opaque payloads.
//!
//! One fixed scheme: AES-256-GCM with a random 96-bit nonce per message.
//! Keys are supplied by the caller; nothing here generates or rotates them.

pub mod encrypter;
pub mod types;

pub use encrypter::Encrypter;
pub use types::{CryptoError, KEY_LEN, NONCE_LEN, TAG_LEN};
