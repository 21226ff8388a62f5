//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (cross-field invariants)
//!     → AppConfig (validated, immutable)
//!     → SecurePolicy built once from AppConfig.security
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new SecureConfig sent to the server
//!     → atomic swap of the shared SecurePolicy
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a full rebuild of the policy
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, ListenerConfig, ObservabilityConfig, PinningConfig, SecureConfig, TimeoutConfig,
    TlsConfig, TransportSecurityConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
