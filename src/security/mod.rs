//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     SecureConfig
//!     → policy.rs (defaults, validation, header rendering)
//!     → SecurePolicy (immutable, shared)
//!
//! Incoming request:
//!     → filter.rs (host allow-list, https redirect)
//!     → wrapped handler
//!     → filter.rs (security response headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: an invalid policy never serves a request
//! - Header values rendered once, cloned per response
//! - Development mode defuses host and transport checks without touching the config

pub mod directives;
pub mod filter;
pub mod matcher;
pub mod policy;

pub use filter::{protect, secure_middleware, shared, with_policy, SharedPolicy, Verdict};
pub use matcher::{HostAllowList, Matcher, SecureTransport, TlsSession};
pub use policy::{PolicyError, SecurePolicy};
