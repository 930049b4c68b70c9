//! Server lifecycle.

use tokio::net::TcpListener;
use tracing::info;

use docuvault_common::{Error, Result};

use crate::config::ServerConfig;
use crate::router::build_router;
use crate::state::AppState;

/// The docuvault HTTP server.
pub struct DocuvaultServer {
    config: ServerConfig,
}

impl DocuvaultServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Initialize state and serve until the process is stopped.
    ///
    /// Initialization (schema setup, vault directory, admin seeding) runs
    /// to completion before the listener binds, so the service never
    /// accepts traffic against a half-initialized store.
    pub async fn serve(self) -> Result<()> {
        let state = AppState::initialize(&self.config)?;
        let app = build_router(state);

        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(addr = %self.config.bind_addr, "docuvault server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_construction() {
        let server = DocuvaultServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr.port(), 5001);
    }
}
