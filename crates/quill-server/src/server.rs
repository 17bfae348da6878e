//! Log server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use quill_auth::TenantRegistry;
use quill_logs::LogBackend;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::ServerError;
use crate::routes::create_router;
use crate::service::LogService;
use crate::state::AppState;

/// HTTP server for log ingestion and retrieval.
#[derive(Debug, Clone)]
pub struct LogServer {
    state: Arc<AppState>,
}

impl LogServer {
    /// Create a server over a tenant registry and persistence backend.
    #[must_use]
    pub fn new(registry: Arc<TenantRegistry>, backend: Arc<dyn LogBackend>) -> Self {
        let service = LogService::new(registry, backend);
        Self {
            state: Arc::new(AppState::new(service)),
        }
    }

    /// Get the shared state for external access.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Start the server and listen for connections.
    ///
    /// Runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self, addr: SocketAddr) -> Result<(), ServerError> {
        self.serve_with_shutdown(addr, std::future::pending()).await
    }

    /// Start the server with graceful shutdown support.
    ///
    /// In-flight requests complete after `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(addr, e))?;

        let local_addr = listener.local_addr().unwrap_or(addr);
        info!(addr = %local_addr, "log server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve)?;

        info!("log server shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    ///
    /// Useful for testing or embedding in another server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_logs::MemoryLogStore;
    use std::time::Duration;

    fn make_server() -> LogServer {
        let registry =
            Arc::new(TenantRegistry::from_entries([("cont123", "secret-a")]).unwrap());
        LogServer::new(registry, Arc::new(MemoryLogStore::new()))
    }

    #[test]
    fn test_state_is_shared() {
        let server = make_server();
        let state = server.state();
        assert!(Arc::ptr_eq(&state, &server.state()));
        assert_eq!(state.uptime_secs(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = occupied.local_addr().unwrap();

        let result = make_server().serve(addr).await;
        assert!(matches!(result, Err(ServerError::BindFailed(a, _)) if a == addr));
    }

    #[tokio::test]
    async fn test_graceful_shutdown() {
        let server = make_server();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            server.serve_with_shutdown(addr, async {}),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }
}
