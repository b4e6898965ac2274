use crate::cli::ServeOpts;
use crate::config::Config;
use crate::gateway::routes;
use crate::providers::GeminiClient;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;

/// Shared state for the relay server. Read-only after startup.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub client: GeminiClient,
    pub shutdown_tx: broadcast::Sender<()>,
    pub start_time: std::time::Instant,
    pub version: String,
}

/// The relay server.
pub struct GatewayServer {
    state: GatewayState,
    addr: SocketAddr,
}

impl GatewayServer {
    /// Prepare the server from configuration and CLI overrides.
    pub async fn start(config: Config, opts: ServeOpts) -> Result<Self> {
        let port = opts.port.unwrap_or(config.server.port);
        let addr = resolve_bind_address(&config, opts.bind.as_deref(), port)?;

        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);
        let client = GeminiClient::new(&config.upstream);

        let state = GatewayState {
            config: Arc::new(config),
            client,
            shutdown_tx,
            start_time: std::time::Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        info!("Relay server binding to {}", addr);

        Ok(Self { state, addr })
    }

    /// Run the server until shutdown signal is received.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let state = self.state.clone();
        let app = routes::build_routes(state.clone());

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("gemrelay v{} listening on {}", state.version, self.addr);

        print_startup_banner(&state, &self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(self.state.shutdown_tx.clone()))
            .await?;

        info!("Relay server shut down gracefully");
        Ok(())
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Trigger graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.state.shutdown_tx.send(());
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }

    let _ = shutdown_tx.send(());
}

/// Resolve the bind address from configuration and CLI override.
fn resolve_bind_address(config: &Config, bind_override: Option<&str>, port: u16) -> Result<SocketAddr> {
    let host = bind_override.unwrap_or(&config.server.bind);
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address: {host}:{port}"))
}

/// Print startup banner with server info.
fn print_startup_banner(state: &GatewayState, addr: &SocketAddr) {
    info!("-------------------------------------------");
    info!("  gemrelay v{}", state.version);
    info!("  Listening on: http://{}", addr);
    info!("  Upstream: {}", state.config.upstream.base_url);
    info!("  Models: http://{}/api/models", addr);
    info!("  Chat: http://{}/api/chat", addr);
    info!("  Health: http://{}/api/health", addr);
    info!("-------------------------------------------");
}
