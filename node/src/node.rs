//! The ripd node: ties the routing core, HTTP server and update scheduler
//! together and owns their lifecycle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast;

use ripd_routing::{Router, RouterIdentity};
use ripd_rpc::RpcServer;

use crate::config::NodeConfig;
use crate::scheduler::UpdateScheduler;
use crate::transport::HttpTransport;
use crate::NodeError;

/// Timeout for waiting on background tasks during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RouterNode {
    config: NodeConfig,
    router: Arc<Router>,
}

impl RouterNode {
    /// Validate `config`, load the neighbor file if one is named, and seed
    /// the routing table.
    pub fn new(mut config: NodeConfig) -> Result<Self, NodeError> {
        config.load_neighbors_file()?;
        config.validate()?;

        let identity = RouterIdentity::new(config.address.clone(), config.network.clone());
        let router = Arc::new(Router::new(
            identity,
            config.neighbors.clone(),
            config.update_interval(),
        ));

        tracing::info!(
            address = %config.address,
            network = %config.network,
            neighbors = config.neighbors.len(),
            interval_secs = config.update_interval_secs,
            summarization = %config.summarization,
            "router initialized"
        );
        for (neighbor, cost) in &config.neighbors {
            tracing::debug!(neighbor = %neighbor, cost, "direct link");
        }

        Ok(Self { config, router })
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Bind the configured listen address and run until SIGINT or SIGTERM.
    pub async fn start(&self) -> Result<(), NodeError> {
        let server = RpcServer::bind(self.config.listen_addr()).await?;
        self.run(server, wait_for_signal()).await
    }

    /// Serve `server` and advertise periodically until `shutdown` resolves.
    pub async fn run<F>(&self, server: RpcServer, shutdown: F) -> Result<(), NodeError>
    where
        F: Future<Output = ()>,
    {
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let transport = Arc::new(HttpTransport::new(self.config.send_timeout()));
        let scheduler = Arc::new(UpdateScheduler::new(
            Arc::clone(&self.router),
            transport,
            self.config.summarization,
        ));
        let scheduler_handle = scheduler.spawn(shutdown_tx.subscribe());

        let mut server_rx = shutdown_tx.subscribe();
        let router = Arc::clone(&self.router);
        let mut server_handle = tokio::spawn(async move {
            server
                .serve(router, async move {
                    let _ = server_rx.recv().await;
                })
                .await
        });

        tracing::info!(address = %self.config.address, "router node started");

        // A server that dies on its own ends the node too.
        let early_exit = tokio::select! {
            _ = shutdown => None,
            result = &mut server_handle => Some(result),
        };

        tracing::info!("router node stopping");
        let _ = shutdown_tx.send(());

        let server_result = match early_exit {
            Some(result) => result,
            None => match tokio::time::timeout(SHUTDOWN_TIMEOUT, server_handle).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("HTTP server did not stop within {:?}", SHUTDOWN_TIMEOUT);
                    Ok(Ok(()))
                }
            },
        };
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, scheduler_handle)
            .await
            .is_err()
        {
            tracing::warn!("update scheduler did not stop within {:?}", SHUTDOWN_TIMEOUT);
        }

        server_result.map_err(|e| NodeError::Task(e.to_string()))??;
        tracing::info!("router node stopped");
        Ok(())
    }
}

/// Wait for SIGTERM or SIGINT.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
        _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
    }
}
