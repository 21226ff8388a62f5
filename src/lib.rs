//! Security headers and transport policy for Axum services, plus an
//! AES-256-GCM encrypter for opaque payloads.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use secure_headers::{security, SecureConfig};
//!
//! # fn main() -> Result<(), secure_headers::PolicyError> {
//! let app = Router::new().route("/", get(|| async { "Hello" }));
//! let app = security::protect(app, SecureConfig {
//!     allowed_hosts: vec!["example.com".into()],
//!     force_secure_transport: true,
//!     ..Default::default()
//! })?;
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::{AppConfig, PinningConfig, SecureConfig, TransportSecurityConfig};
pub use crypto::{CryptoError, Encrypter};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::{PolicyError, SecurePolicy};
