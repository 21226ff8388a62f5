//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the secure server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security headers and transport policy.
    pub security: SecureConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security headers and transport policy options.
///
/// Empty strings mean "not configured". The frame and XSS-protection tokens
/// fall back to their defaults when the policy is built.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SecureConfig {
    /// Fully qualified host names allowed to point to this server. Empty allows all.
    pub allowed_hosts: Vec<String>,

    /// Content Security Policy, sent verbatim.
    pub content_security_policy: String,

    /// X-Frame-Options token. Defaults to `SAMEORIGIN`.
    pub frame: String,

    /// HTTP Public Key Pinning options.
    pub public_key_pins: Option<PinningConfig>,

    /// HTTP Strict Transport Security options.
    pub strict_transport_security: Option<TransportSecurityConfig>,

    /// Referrer-Policy token.
    pub referrer_policy: String,

    /// X-XSS-Protection token. Defaults to `1; mode=block`.
    pub xss_protection: String,

    /// Redirect insecure requests to https.
    pub force_secure_transport: bool,

    /// Defuses the allowed hosts, pinning, strict transport security and
    /// forced redirect options.
    pub development_mode: bool,
}

/// HTTP Public Key Pinning options (RFC 7469).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PinningConfig {
    /// Base64 encoded SPKI fingerprints. At least one is required.
    pub keys: Vec<String>,

    /// How long clients remember the pins. Required.
    #[serde(rename = "max_age_secs", with = "duration_secs")]
    pub max_age: Duration,

    pub include_subdomains: bool,

    /// Where clients report pin validation failures.
    pub report_uri: Option<String>,
}

/// HTTP Strict Transport Security options (RFC 6797).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TransportSecurityConfig {
    /// How long clients only use https for this site. Required.
    #[serde(rename = "max_age_secs", with = "duration_secs")]
    pub max_age: Duration,

    pub include_subdomains: bool,

    /// Opt into browser preload lists. Requires subdomains and a long max age.
    pub preload: bool,
}

/// Durations are written as whole seconds in config files.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
