//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Put the application router behind the security filter
//! - Wire up middleware (tracing, timeout)
//! - Serve plain HTTP or TLS, marking TLS connections for the filter
//! - Swap in reloaded security policies
//! - Graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::{AppConfig, SecureConfig};
use crate::observability::metrics;
use crate::security::{shared, with_policy, PolicyError, SecurePolicy, SharedPolicy, TlsSession};

/// How long TLS connections get to finish after shutdown is triggered.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP server serving an application behind the security policy.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    policy: SharedPolicy,
}

impl HttpServer {
    /// Build the server. Fails if the security policy is invalid.
    pub fn new(config: AppConfig, app: Router) -> Result<Self, PolicyError> {
        let policy = shared(SecurePolicy::from_config(config.security.clone())?);
        let router = Self::build_router(&config, app, policy.clone());
        Ok(Self {
            router,
            config,
            policy,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, app: Router, policy: SharedPolicy) -> Router {
        with_policy(app, policy)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The policy requests are currently evaluated against.
    pub fn policy(&self) -> SharedPolicy {
        self.policy.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<SecureConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        spawn_policy_reloader(self.policy.clone(), config_updates);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<SecureConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        spawn_policy_reloader(self.policy.clone(), config_updates);

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            shutdown_handle.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(mark_tls(self.router).into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Every request on a TLS listener arrived over TLS. The marker is the
/// outermost layer so the security filter sees it.
fn mark_tls(router: Router) -> Router {
    router.layer(Extension(TlsSession))
}

/// Rebuild the policy for every config update. A config that fails to build
/// leaves the current policy in place.
fn spawn_policy_reloader(
    policy: SharedPolicy,
    mut config_updates: mpsc::UnboundedReceiver<SecureConfig>,
) {
    tokio::spawn(async move {
        while let Some(config) = config_updates.recv().await {
            match SecurePolicy::from_config(config) {
                Ok(next) => {
                    policy.store(Arc::new(next));
                    metrics::record_policy_reload(true);
                    tracing::info!("Security policy reloaded");
                }
                Err(e) => {
                    metrics::record_policy_reload(false);
                    tracing::error!(error = %e, "Rejected security policy reload, keeping current policy");
                }
            }
        }
    });
}
