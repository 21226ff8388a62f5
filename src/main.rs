//! Secure headers server.
//!
//! Serves a `Hello` handler behind the security filter.
//!
//! ```text
//!   Client Request
//!   ──────────────▶ listener (plain / TLS) ──▶ trace ──▶ timeout
//!                                                          │
//!                                                          ▼
//!                                              ┌───────────────────────┐
//!                                              │    security filter    │
//!                                              │ hosts → https → hdrs  │
//!                                              └───────────┬───────────┘
//!   Client Response                                        ▼
//!   ◀────────────── security headers ◀──────────────── handler
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{routing::get, Router};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use secure_headers::config::{load_config, AppConfig, ConfigWatcher};
use secure_headers::http::{load_tls_config, HttpServer};
use secure_headers::observability::{logging, metrics};
use secure_headers::Shutdown;

#[derive(Parser)]
#[command(name = "secure-headers")]
#[command(about = "HTTP server enforcing security headers and transport policy", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the security policy when the configuration file changes.
    #[arg(long, requires = "config")]
    watch: bool,
}

async fn hello() -> &'static str {
    "Hello"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("secure-headers v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (watcher, config_updates) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let app = Router::new()
        .route("/", get(hello))
        .route("/{*path}", get(hello));

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, app)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.on_ctrl_c());

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse()?;
            let tls_config = load_tls_config(tls.cert_path.as_ref(), tls.key_path.as_ref()).await?;
            server.run_tls(addr, tls_config, config_updates, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, config_updates, server_shutdown).await?;
        }
    }

    drop(watcher);
    tracing::info!("Shutdown complete");
    Ok(())
}
