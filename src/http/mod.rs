//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (plain or TLS)
//!     → server.rs (Axum setup, TlsSession marker on TLS listeners)
//!     → trace, timeout
//!     → security filter
//!     → application router
//! ```

pub mod server;
pub mod tls;

pub use server::HttpServer;
pub use tls::load_tls_config;
