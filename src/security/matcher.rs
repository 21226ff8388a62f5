//! Request matching for the transport policy.
//!
//! # Responsibilities
//! - Match the request host against the allow-list (exact match)
//! - Detect whether a request arrived over a secure transport
//!
//! # Design Decisions
//! - Host matching is exact string equality; no wildcard or subdomain matching
//! - A request is secure when any of the scheme, the connection or the
//!   `X-Forwarded-Proto` header says https

use std::borrow::Cow;

use axum::body::Body;
use axum::http::{header, HeaderName, Request};

/// `X-Forwarded-Proto`, set by TLS-terminating proxies.
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Request extension marking a connection that was accepted over TLS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TlsSession;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// The host a request targets: `host[:port]` of the URI authority for
/// absolute-form requests, the `Host` header otherwise. Userinfo is dropped.
pub fn request_host(req: &Request<Body>) -> Option<Cow<'_, str>> {
    let host = match req.uri().authority() {
        Some(authority) => match authority.port() {
            Some(port) => Cow::Owned(format!("{}:{}", authority.host(), port.as_str())),
            None => Cow::Borrowed(authority.host()),
        },
        None => Cow::Borrowed(req.headers().get(header::HOST)?.to_str().ok()?),
    };
    (!host.is_empty()).then_some(host)
}

/// Matches requests whose host is one of the allowed hosts.
#[derive(Debug, Clone, Default)]
pub struct HostAllowList {
    hosts: Vec<String>,
}

impl HostAllowList {
    pub fn new(hosts: impl IntoIterator<Item = String>) -> Self {
        Self {
            hosts: hosts.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.iter().any(|allowed| allowed == host)
    }
}

impl Matcher for HostAllowList {
    fn matches(&self, req: &Request<Body>) -> bool {
        request_host(req).is_some_and(|host| self.contains(&host))
    }
}

/// Matches requests that arrived over a secure transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureTransport;

impl Matcher for SecureTransport {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().scheme_str() == Some("https")
            || req.extensions().get::<TlsSession>().is_some()
            || req
                .headers()
                .get(X_FORWARDED_PROTO)
                .is_some_and(|proto| proto.as_bytes() == b"https")
    }
}
