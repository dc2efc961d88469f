//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use ripd_routing::Router;

use crate::error::RpcError;
use crate::handlers;

/// Build the HTTP application around the shared router.
pub fn app(router: Arc<Router>) -> axum::Router {
    axum::Router::new()
        .route("/receive_update", post(handlers::receive_update))
        .route("/routes", get(handlers::routes))
        .with_state(router)
}

/// A bound listener ready to serve the node's endpoints.
pub struct RpcServer {
    listener: TcpListener,
}

impl RpcServer {
    /// Bind the listening socket. Binding is separate from serving so the
    /// caller learns the real address (e.g. when binding port 0).
    pub async fn bind(addr: SocketAddr) -> Result<Self, RpcError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {addr}: {e}")))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RpcError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, router: Arc<Router>, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = self.listener.local_addr() {
            info!("HTTP server listening on {}", addr);
        }
        axum::serve(self.listener, app(router))
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
