//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Build policy → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → listeners stop accepting and drain
//! ```
//!
//! # Design Decisions
//! - Fail fast: an invalid policy is fatal at startup
//! - Shutdown is a broadcast so every listener observes it

pub mod shutdown;

pub use shutdown::Shutdown;
