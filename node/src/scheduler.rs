//! Periodic advertisement of the routing table to every neighbor.
//!
//! Each cycle snapshots the live table, summarizes the copy, and fans it out
//! to all neighbors concurrently. A cycle runs in its own task, so a slow or
//! dead neighbor can delay neither the other deliveries nor the next tick.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use ripd_routing::{Router, SummaryStrategy};

use crate::transport::{Transport, TransportError};

/// Best-effort outcome of one advertisement cycle.
#[derive(Clone, Debug, Default)]
pub struct AdvertisementReport {
    /// Neighbors that accepted the update.
    pub delivered: Vec<String>,
    /// Neighbors that could not be reached, with the reason.
    pub failed: Vec<(String, TransportError)>,
}

impl AdvertisementReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

pub struct UpdateScheduler<T: Transport> {
    router: Arc<Router>,
    transport: Arc<T>,
    strategy: SummaryStrategy,
}

impl<T: Transport> UpdateScheduler<T> {
    pub fn new(router: Arc<Router>, transport: Arc<T>, strategy: SummaryStrategy) -> Self {
        Self {
            router,
            transport,
            strategy,
        }
    }

    /// Run one advertisement cycle and wait for every delivery to finish.
    pub async fn advertise_once(&self) -> AdvertisementReport {
        let message = self.router.advertisement(self.strategy).await;
        tracing::info!(
            neighbors = self.router.neighbors().len(),
            routes = message.routing_table.len(),
            strategy = %self.strategy,
            "sending periodic update to neighbors"
        );

        let deliveries = self.router.neighbors().keys().map(|neighbor| {
            let message = &message;
            async move {
                let result = self.transport.send(neighbor, message).await;
                (neighbor.clone(), result)
            }
        });

        let mut report = AdvertisementReport::default();
        for (neighbor, result) in join_all(deliveries).await {
            match result {
                Ok(()) => {
                    tracing::debug!(neighbor = %neighbor, "update delivered");
                    report.delivered.push(neighbor);
                }
                Err(e) => {
                    tracing::warn!(neighbor = %neighbor, error = %e, "could not reach neighbor");
                    report.failed.push((neighbor, e));
                }
            }
        }
        report
    }

    /// Start the periodic loop. The first advertisement goes out one
    /// interval after start; the loop ends when `shutdown` fires.
    pub fn spawn(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.router.update_interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await; // the first tick completes immediately

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.recv() => {
                        tracing::info!("update scheduler shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let cycle = Arc::clone(&self);
                        tokio::spawn(async move {
                            cycle.advertise_once().await;
                        });
                    }
                }
            }
        })
    }
}
