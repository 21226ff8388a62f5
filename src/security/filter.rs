//! Security headers and transport policy middleware.
//!
//! Per request:
//! 1. Host allow-list (skipped in development mode) → 404 on mismatch
//! 2. Secure transport detection → 301 to https when forced (skipped in development mode)
//! 3. Public-Key-Pins and Strict-Transport-Security (skipped in development mode)
//! 4. CSP, Referrer-Policy, X-Content-Type-Options, X-Frame-Options, X-XSS-Protection
//! 5. Wrapped handler

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::config::schema::SecureConfig;
use crate::observability::metrics;
use crate::security::matcher::{request_host, Matcher, SecureTransport};
use crate::security::policy::{PolicyError, SecurePolicy};

pub const PUBLIC_KEY_PINS: HeaderName = HeaderName::from_static("public-key-pins");
pub const X_CONTENT_SECURITY_POLICY: HeaderName =
    HeaderName::from_static("x-content-security-policy");
pub const X_WEBKIT_CSP: HeaderName = HeaderName::from_static("x-webkit-csp");

const NOSNIFF: HeaderValue = HeaderValue::from_static("nosniff");

/// Policy shared by every request. Swapped atomically when the config is reloaded.
pub type SharedPolicy = Arc<ArcSwap<SecurePolicy>>;

/// Outcome of evaluating a request against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Run the wrapped handler.
    Proceed { secure: bool },
    /// The host is not allowed.
    NotFound,
    /// Insecure request; redirect permanently to this https location.
    Redirect(String),
    /// Insecure request without a host to redirect to.
    BadRequest,
}

impl SecurePolicy {
    /// Decide what to do with a request. Pure: nothing is written.
    pub fn evaluate(&self, req: &Request<Body>) -> Verdict {
        if self.enforces_host_allow_list() && !self.allowed_hosts().matches(req) {
            return Verdict::NotFound;
        }

        let secure = SecureTransport.matches(req);
        if self.enforces_transport_policy() && self.force_secure_transport() && !secure {
            return match https_location(req) {
                Some(location) => Verdict::Redirect(location),
                None => Verdict::BadRequest,
            };
        }

        Verdict::Proceed { secure }
    }

    /// Write the policy headers. Headers the handler already set are left alone.
    pub fn apply_headers(&self, headers: &mut HeaderMap, secure: bool) {
        if self.enforces_transport_policy() {
            if secure {
                if let Some(pins) = self.public_key_pins() {
                    set_if_absent(headers, PUBLIC_KEY_PINS, pins);
                }
            }
            if let Some(hsts) = self.strict_transport_security() {
                set_if_absent(headers, header::STRICT_TRANSPORT_SECURITY, hsts);
            }
        }

        if let Some(csp) = self.content_security_policy() {
            set_if_absent(headers, header::CONTENT_SECURITY_POLICY, csp);
            set_if_absent(headers, X_CONTENT_SECURITY_POLICY, csp);
            set_if_absent(headers, X_WEBKIT_CSP, csp);
        }
        if let Some(referrer) = self.referrer_policy() {
            set_if_absent(headers, header::REFERRER_POLICY, referrer);
        }

        set_if_absent(headers, header::X_CONTENT_TYPE_OPTIONS, &NOSNIFF);
        set_if_absent(headers, header::X_FRAME_OPTIONS, self.frame_options());
        set_if_absent(headers, header::X_XSS_PROTECTION, self.xss_protection());
    }
}

fn set_if_absent(headers: &mut HeaderMap, name: HeaderName, value: &HeaderValue) {
    if let header::Entry::Vacant(slot) = headers.entry(name) {
        slot.insert(value.clone());
    }
}

/// The request URL with its scheme rewritten to https.
fn https_location(req: &Request<Body>) -> Option<String> {
    let host = request_host(req)?;
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    Some(format!("https://{host}{path}"))
}

/// Middleware enforcing the shared [`SecurePolicy`].
pub async fn secure_middleware(
    State(policy): State<SharedPolicy>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let policy = policy.load_full();

    let secure = match policy.evaluate(&req) {
        Verdict::Proceed { secure } => secure,
        Verdict::NotFound => {
            tracing::debug!(host = ?request_host(&req), "Host not allowed");
            metrics::record_host_rejected();
            return (StatusCode::NOT_FOUND, "404 page not found").into_response();
        }
        Verdict::Redirect(location) => {
            tracing::debug!(location = %location, "Redirecting insecure request");
            metrics::record_https_redirect();
            return match HeaderValue::try_from(location) {
                Ok(location) => {
                    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
                }
                Err(_) => StatusCode::BAD_REQUEST.into_response(),
            };
        }
        Verdict::BadRequest => {
            tracing::debug!(uri = %req.uri(), "Insecure request without host");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let mut response = next.run(req).await;
    policy.apply_headers(response.headers_mut(), secure);
    response
}

/// Wrap a policy for sharing across requests.
pub fn shared(policy: SecurePolicy) -> SharedPolicy {
    Arc::new(ArcSwap::from_pointee(policy))
}

/// Put `router` behind an already built policy.
pub fn with_policy(router: Router, policy: SharedPolicy) -> Router {
    router.layer(middleware::from_fn_with_state(policy, secure_middleware))
}

/// Validate `config` and put `router` behind it.
pub fn protect(router: Router, config: SecureConfig) -> Result<Router, PolicyError> {
    let policy = SecurePolicy::from_config(config)?;
    Ok(with_policy(router, shared(policy)))
}
