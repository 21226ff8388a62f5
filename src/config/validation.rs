//! Configuration validation.
//!
//! # Responsibilities
//! - Enforce the cross-field invariants of the pinning and strict transport
//!   security options before any header is rendered
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SecureConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::time::Duration;

use crate::config::schema::{PinningConfig, SecureConfig, TransportSecurityConfig};
use crate::security::directives::HSTS_PRELOAD_MIN_AGE;

/// A violated configuration invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one key must be set when using public key pinning")]
    PinningWithoutKeys,

    #[error("max age must be set when using public key pinning")]
    PinningWithoutMaxAge,

    #[error("force_secure_transport must be true when using strict transport security")]
    TransportSecurityWithoutForcedSecure,

    #[error("max age must be set when using strict transport security")]
    TransportSecurityWithoutMaxAge,

    #[error("max age must be at least {min} seconds when using preload, got {actual}")]
    PreloadMaxAgeTooShort { min: u64, actual: u64 },

    #[error("subdomains must be included when using preload")]
    PreloadWithoutSubdomains,
}

/// Check every invariant of the security options.
pub fn validate_config(config: &SecureConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(pins) = &config.public_key_pins {
        validate_pinning(pins, &mut errors);
    }
    if let Some(hsts) = &config.strict_transport_security {
        validate_transport_security(hsts, config.force_secure_transport, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_pinning(pins: &PinningConfig, errors: &mut Vec<ValidationError>) {
    if pins.keys.is_empty() {
        errors.push(ValidationError::PinningWithoutKeys);
    }
    if pins.max_age.is_zero() {
        errors.push(ValidationError::PinningWithoutMaxAge);
    }
}

fn validate_transport_security(
    hsts: &TransportSecurityConfig,
    force_secure_transport: bool,
    errors: &mut Vec<ValidationError>,
) {
    if !force_secure_transport {
        errors.push(ValidationError::TransportSecurityWithoutForcedSecure);
    }
    if hsts.max_age.is_zero() {
        errors.push(ValidationError::TransportSecurityWithoutMaxAge);
    }
    if hsts.preload {
        if hsts.max_age < Duration::from_secs(HSTS_PRELOAD_MIN_AGE) {
            errors.push(ValidationError::PreloadMaxAgeTooShort {
                min: HSTS_PRELOAD_MIN_AGE,
                actual: hsts.max_age.as_secs(),
            });
        }
        if !hsts.include_subdomains {
            errors.push(ValidationError::PreloadWithoutSubdomains);
        }
    }
}
