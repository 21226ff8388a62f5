//! Header directive values.

use std::time::Duration;

/// The page cannot be displayed in a frame, regardless of the site attempting to do so.
pub const FRAME_DENIED: &str = "DENY";
/// The page can only be displayed in a frame on the same origin as the page itself.
pub const FRAME_SAME_ORIGIN: &str = "SAMEORIGIN";

/// Default pinning max age of 30 days.
pub const HPKP_DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Default strict transport security max age of 30 days.
pub const HSTS_DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Lowest max age, in seconds, accepted for HSTS preload (18 weeks).
/// See https://hstspreload.org.
pub const HSTS_PRELOAD_MIN_AGE: u64 = 10_886_400;

pub const REFERRER_POLICY_NO_REFERRER: &str = "no-referrer";
pub const REFERRER_POLICY_NO_REFERRER_WHEN_DOWNGRADE: &str = "no-referrer-when-downgrade";
pub const REFERRER_POLICY_SAME_ORIGIN: &str = "same-origin";
pub const REFERRER_POLICY_ORIGIN: &str = "origin";
pub const REFERRER_POLICY_STRICT_ORIGIN: &str = "strict-origin";
pub const REFERRER_POLICY_ORIGIN_WHEN_CROSS_ORIGIN: &str = "origin-when-cross-origin";
pub const REFERRER_POLICY_STRICT_ORIGIN_WHEN_CROSS_ORIGIN: &str =
    "strict-origin-when-cross-origin";
pub const REFERRER_POLICY_UNSAFE_URL: &str = "unsafe-url";

/// Disables XSS filtering.
pub const XSS_PROTECTION_DISABLED: &str = "0";
/// Enables XSS filtering; the browser sanitizes the page when an attack is detected.
pub const XSS_PROTECTION_ENABLED: &str = "1";
/// Enables XSS filtering; the browser refuses to render the page when an attack is detected.
pub const XSS_PROTECTION_BLOCK: &str = "1; mode=block";

/// Allow the page to be displayed in a frame on `origin`.
pub fn frame_allow(origin: &str) -> String {
    format!("ALLOW-FROM {origin}")
}

/// Enable XSS filtering and report violations to `uri` (Chromium only).
pub fn xss_protection_report(uri: &str) -> String {
    format!("1; report={uri}")
}
