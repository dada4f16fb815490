//! HTTP server

pub mod routes;
pub mod state;

pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::AutosConfig;
use crate::error::{Error, Result};
use crate::retention::RetentionSweeper;

/// The assembled service: router, state and the retention sweeper
pub struct AutosServer {
    state: AppState,
    address: SocketAddr,
}

impl AutosServer {
    pub fn new(config: AutosConfig) -> Result<Self> {
        let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid server address: {}", e)))?;

        let state = AppState::new(config)?;
        Ok(Self { state, address })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Serve until ctrl-c; the retention sweeper runs for the same lifetime
    pub async fn start(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let sweeper = Arc::new(RetentionSweeper::new(
            Arc::clone(self.state.store()),
            &self.state.config().retention,
        ));
        let sweeper_handle = sweeper.spawn(shutdown_rx);

        let router = routes::router(self.state);
        let listener = tokio::net::TcpListener::bind(self.address).await?;
        tracing::info!(address = %self.address, "server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutdown signal received");
            })
            .await
            .map_err(|e| Error::internal(format!("server error: {}", e)))?;

        let _ = shutdown_tx.send(true);
        let _ = sweeper_handle.await;
        Ok(())
    }
}
