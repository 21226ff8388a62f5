//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use secure_headers::{AppConfig, HttpServer, SecureConfig, Shutdown};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A router whose handler counts its invocations.
pub fn counting_app() -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let handler = move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            "Hello"
        }
    };
    let app = Router::new()
        .route("/", get(handler.clone()))
        .route("/{*path}", get(handler));
    (app, calls)
}

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicUsize>,
    pub updates: mpsc::UnboundedSender<SecureConfig>,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub async fn start(security: SecureConfig) -> Self {
        let mut config = AppConfig::default();
        config.security = security;

        let (app, calls) = counting_app();
        let server = HttpServer::new(config, app).expect("valid policy");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let (updates, config_updates) = mpsc::unbounded_channel();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, config_updates, server_shutdown).await;
        });

        Self {
            addr,
            calls,
            updates,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// HTTP client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
