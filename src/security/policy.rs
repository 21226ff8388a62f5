//! Validated security policy and pre-rendered header values.
//!
//! A [`SecurePolicy`] is built once from a [`SecureConfig`]. Building applies
//! the directive defaults, enforces every configuration invariant and renders
//! each header into a [`HeaderValue`]. Requests only ever read the result.

use std::time::Duration;

use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;

use crate::config::loader::join_errors;
use crate::config::schema::{PinningConfig, SecureConfig, TransportSecurityConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::security::directives::{FRAME_SAME_ORIGIN, XSS_PROTECTION_BLOCK};
use crate::security::matcher::HostAllowList;

/// Error building a [`SecurePolicy`]. Always fatal: the server must not start.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid security configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("{header} value is not a valid HTTP header value")]
    InvalidHeaderValue {
        header: &'static str,
        #[source]
        source: InvalidHeaderValue,
    },
}

/// Immutable, validated security policy shared by all requests.
#[derive(Debug, Clone)]
pub struct SecurePolicy {
    config: SecureConfig,
    allowed_hosts: HostAllowList,
    public_key_pins: Option<HeaderValue>,
    strict_transport_security: Option<HeaderValue>,
    content_security_policy: Option<HeaderValue>,
    referrer_policy: Option<HeaderValue>,
    frame_options: HeaderValue,
    xss_protection: HeaderValue,
}

impl SecurePolicy {
    /// Validate `config` and render every header it configures.
    pub fn from_config(mut config: SecureConfig) -> Result<Self, PolicyError> {
        if config.frame.is_empty() {
            config.frame = FRAME_SAME_ORIGIN.to_string();
        }
        if config.xss_protection.is_empty() {
            config.xss_protection = XSS_PROTECTION_BLOCK.to_string();
        }

        validate_config(&config).map_err(PolicyError::Invalid)?;

        let public_key_pins = config
            .public_key_pins
            .as_ref()
            .map(|pins| header_value("Public-Key-Pins", &render_public_key_pins(pins)))
            .transpose()?;
        let strict_transport_security = config
            .strict_transport_security
            .as_ref()
            .map(|hsts| {
                header_value(
                    "Strict-Transport-Security",
                    &render_strict_transport_security(hsts),
                )
            })
            .transpose()?;
        let content_security_policy = optional_header_value(
            "Content-Security-Policy",
            &config.content_security_policy,
        )?;
        let referrer_policy = optional_header_value("Referrer-Policy", &config.referrer_policy)?;
        let frame_options = header_value("X-Frame-Options", &config.frame)?;
        let xss_protection = header_value("X-XSS-Protection", &config.xss_protection)?;

        tracing::debug!(
            allowed_hosts = config.allowed_hosts.len(),
            pinning = public_key_pins.is_some(),
            strict_transport_security = strict_transport_security.is_some(),
            force_secure_transport = config.force_secure_transport,
            development_mode = config.development_mode,
            "Security policy built"
        );

        Ok(Self {
            allowed_hosts: HostAllowList::new(config.allowed_hosts.iter().cloned()),
            config,
            public_key_pins,
            strict_transport_security,
            content_security_policy,
            referrer_policy,
            frame_options,
            xss_protection,
        })
    }

    /// The configuration this policy was built from, with defaults applied.
    pub fn config(&self) -> &SecureConfig {
        &self.config
    }

    pub fn allowed_hosts(&self) -> &HostAllowList {
        &self.allowed_hosts
    }

    /// Whether requests must present an allowed host.
    pub fn enforces_host_allow_list(&self) -> bool {
        !self.config.development_mode && !self.allowed_hosts.is_empty()
    }

    /// Whether forced redirects, pinning and strict transport security apply.
    pub fn enforces_transport_policy(&self) -> bool {
        !self.config.development_mode
    }

    pub fn force_secure_transport(&self) -> bool {
        self.config.force_secure_transport
    }

    pub fn public_key_pins(&self) -> Option<&HeaderValue> {
        self.public_key_pins.as_ref()
    }

    pub fn strict_transport_security(&self) -> Option<&HeaderValue> {
        self.strict_transport_security.as_ref()
    }

    pub fn content_security_policy(&self) -> Option<&HeaderValue> {
        self.content_security_policy.as_ref()
    }

    pub fn referrer_policy(&self) -> Option<&HeaderValue> {
        self.referrer_policy.as_ref()
    }

    pub fn frame_options(&self) -> &HeaderValue {
        &self.frame_options
    }

    pub fn xss_protection(&self) -> &HeaderValue {
        &self.xss_protection
    }
}

/// Render the `Public-Key-Pins` value of a validated pinning config.
///
/// ```text
/// pin-sha256="<key>"; pin-sha256="<key>"; <secs>[; includeSubdomains][; report-uri="<uri>"]
/// ```
pub fn render_public_key_pins(pins: &PinningConfig) -> String {
    let mut value = pins
        .keys
        .iter()
        .map(|key| format!("pin-sha256=\"{key}\""))
        .collect::<Vec<_>>()
        .join("; ");
    value.push_str(&format!("; {}", whole_seconds(pins.max_age)));
    if pins.include_subdomains {
        value.push_str("; includeSubdomains");
    }
    if let Some(uri) = pins.report_uri.as_deref().filter(|uri| !uri.is_empty()) {
        value.push_str(&format!("; report-uri=\"{uri}\""));
    }
    value
}

/// Render the `Strict-Transport-Security` value of a validated config.
pub fn render_strict_transport_security(hsts: &TransportSecurityConfig) -> String {
    let mut value = whole_seconds(hsts.max_age).to_string();
    if hsts.include_subdomains {
        value.push_str("; includeSubdomains");
    }
    if hsts.preload {
        value.push_str("; preload");
    }
    value
}

/// Round to the nearest whole second, ties to even.
fn whole_seconds(duration: Duration) -> u64 {
    const HALF: u32 = 500_000_000;
    let secs = duration.as_secs();
    let round_up = match duration.subsec_nanos() {
        nanos if nanos > HALF => true,
        HALF => secs % 2 == 1,
        _ => false,
    };
    secs + u64::from(round_up)
}

fn header_value(header: &'static str, value: &str) -> Result<HeaderValue, PolicyError> {
    HeaderValue::from_str(value).map_err(|source| PolicyError::InvalidHeaderValue { header, source })
}

fn optional_header_value(
    header: &'static str,
    value: &str,
) -> Result<Option<HeaderValue>, PolicyError> {
    if value.is_empty() {
        return Ok(None);
    }
    header_value(header, value).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::directives::{frame_allow, HSTS_PRELOAD_MIN_AGE, XSS_PROTECTION_DISABLED};

    fn pins(keys: &[&str], max_age_secs: u64) -> PinningConfig {
        PinningConfig {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            max_age: Duration::from_secs(max_age_secs),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let policy = SecurePolicy::from_config(SecureConfig::default()).unwrap();
        assert_eq!(policy.frame_options(), "SAMEORIGIN");
        assert_eq!(policy.xss_protection(), "1; mode=block");
        assert_eq!(policy.config().frame, FRAME_SAME_ORIGIN);
        assert_eq!(policy.config().xss_protection, XSS_PROTECTION_BLOCK);
        assert!(policy.public_key_pins().is_none());
        assert!(policy.strict_transport_security().is_none());
        assert!(policy.content_security_policy().is_none());
        assert!(policy.referrer_policy().is_none());
    }

    #[test]
    fn test_configured_tokens_kept() {
        let config = SecureConfig {
            frame: frame_allow("https://example.com"),
            xss_protection: XSS_PROTECTION_DISABLED.to_string(),
            ..Default::default()
        };
        let policy = SecurePolicy::from_config(config).unwrap();
        assert_eq!(policy.frame_options(), "ALLOW-FROM https://example.com");
        assert_eq!(policy.xss_protection(), "0");
    }

    #[test]
    fn test_render_public_key_pins() {
        let mut config = pins(&["abc=", "def="], 2_592_000);
        assert_eq!(
            render_public_key_pins(&config),
            r#"pin-sha256="abc="; pin-sha256="def="; 2592000"#
        );

        config.include_subdomains = true;
        config.report_uri = Some("https://example.com/hpkp".to_string());
        assert_eq!(
            render_public_key_pins(&config),
            r#"pin-sha256="abc="; pin-sha256="def="; 2592000; includeSubdomains; report-uri="https://example.com/hpkp""#
        );
    }

    #[test]
    fn test_render_rounds_to_whole_seconds() {
        let config = PinningConfig {
            keys: vec!["abc=".to_string()],
            max_age: Duration::from_millis(59_600),
            ..Default::default()
        };
        assert_eq!(render_public_key_pins(&config), r#"pin-sha256="abc="; 60"#);
    }

    #[test]
    fn test_half_seconds_round_to_even() {
        assert_eq!(whole_seconds(Duration::from_millis(2_500)), 2);
        assert_eq!(whole_seconds(Duration::from_millis(3_500)), 4);
        assert_eq!(whole_seconds(Duration::from_millis(2_501)), 3);
        assert_eq!(whole_seconds(Duration::from_millis(499)), 0);

        let hsts = TransportSecurityConfig {
            max_age: Duration::from_millis(2_500),
            ..Default::default()
        };
        assert_eq!(render_strict_transport_security(&hsts), "2");
    }

    #[test]
    fn test_pinning_without_keys_fails() {
        let config = SecureConfig {
            public_key_pins: Some(pins(&[], 60)),
            ..Default::default()
        };
        match SecurePolicy::from_config(config) {
            Err(PolicyError::Invalid(errors)) => {
                assert_eq!(errors, vec![ValidationError::PinningWithoutKeys])
            }
            other => panic!("expected invalid policy, got {:?}", other),
        }
    }

    #[test]
    fn test_pinning_without_max_age_fails() {
        let config = SecureConfig {
            public_key_pins: Some(pins(&["abc="], 0)),
            ..Default::default()
        };
        assert!(matches!(
            SecurePolicy::from_config(config),
            Err(PolicyError::Invalid(_))
        ));
    }

    #[test]
    fn test_preload_header() {
        let config = SecureConfig {
            force_secure_transport: true,
            strict_transport_security: Some(TransportSecurityConfig {
                max_age: Duration::from_secs(HSTS_PRELOAD_MIN_AGE),
                include_subdomains: true,
                preload: true,
            }),
            ..Default::default()
        };
        let policy = SecurePolicy::from_config(config).unwrap();
        assert_eq!(
            policy.strict_transport_security().unwrap(),
            "10886400; includeSubdomains; preload"
        );
    }

    #[test]
    fn test_render_plain_strict_transport_security() {
        let hsts = TransportSecurityConfig {
            max_age: Duration::from_secs(31_536_000),
            ..Default::default()
        };
        assert_eq!(render_strict_transport_security(&hsts), "31536000");
    }

    #[test]
    fn test_preload_without_subdomains_fails() {
        let config = SecureConfig {
            force_secure_transport: true,
            strict_transport_security: Some(TransportSecurityConfig {
                max_age: Duration::from_secs(HSTS_PRELOAD_MIN_AGE * 2),
                include_subdomains: false,
                preload: true,
            }),
            ..Default::default()
        };
        assert!(SecurePolicy::from_config(config).is_err());
    }

    #[test]
    fn test_input_config_untouched() {
        let config = SecureConfig::default();
        let policy = SecurePolicy::from_config(config.clone()).unwrap();
        assert!(config.frame.is_empty());
        assert!(config.xss_protection.is_empty());
        assert_ne!(policy.config(), &config);
    }

    #[test]
    fn test_invalid_header_text_fails() {
        let config = SecureConfig {
            content_security_policy: "default-src 'self'\r\nX-Injected: 1".to_string(),
            ..Default::default()
        };
        match SecurePolicy::from_config(config) {
            Err(PolicyError::InvalidHeaderValue { header, .. }) => {
                assert_eq!(header, "Content-Security-Policy")
            }
            other => panic!("expected invalid header value, got {:?}", other),
        }
    }

    #[test]
    fn test_development_mode_gates() {
        let config = SecureConfig {
            allowed_hosts: vec!["example.com".to_string()],
            development_mode: true,
            ..Default::default()
        };
        let policy = SecurePolicy::from_config(config).unwrap();
        assert!(!policy.enforces_host_allow_list());
        assert!(!policy.enforces_transport_policy());
        assert_eq!(policy.config().allowed_hosts, vec!["example.com"]);
    }
}
