//! The single shared routing table and the operations allowed on it.
//!
//! The periodic advertiser and the inbound update handler both go through
//! [`Router`]; the table itself is never handed out by reference. Every
//! access takes the same `tokio::sync::Mutex`, and critical sections only
//! clone or relax, never perform I/O.

use std::time::Duration;

use ripd_types::UpdateMessage;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::relax::{relax, RelaxOutcome};
use crate::summarize::SummaryStrategy;
use crate::table::RoutingTable;
use crate::NeighborCosts;

/// Who this router is: its `host:port` address and the network it
/// administers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouterIdentity {
    pub address: String,
    pub network: String,
}

impl RouterIdentity {
    pub fn new(address: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            network: network.into(),
        }
    }

    /// Whether a destination key refers to this router itself.
    pub fn is_self(&self, key: &str) -> bool {
        key == self.address || key == self.network
    }
}

pub struct Router {
    identity: RouterIdentity,
    neighbors: NeighborCosts,
    update_interval: Duration,
    table: Mutex<RoutingTable>,
}

impl Router {
    /// Create a router with its startup table seeded from `neighbors`.
    pub fn new(
        identity: RouterIdentity,
        neighbors: NeighborCosts,
        update_interval: Duration,
    ) -> Self {
        let table = RoutingTable::seeded(&identity.network, &neighbors);
        Self {
            identity,
            neighbors,
            update_interval,
            table: Mutex::new(table),
        }
    }

    pub fn identity(&self) -> &RouterIdentity {
        &self.identity
    }

    pub fn neighbors(&self) -> &NeighborCosts {
        &self.neighbors
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn is_neighbor(&self, address: &str) -> bool {
        self.neighbors.contains_key(address)
    }

    /// Point-in-time copy of the live, unsummarized table.
    pub async fn snapshot(&self) -> RoutingTable {
        self.table.lock().await.snapshot()
    }

    /// Merge a neighbor's advertisement into the live table.
    pub async fn apply_update(&self, update: &UpdateMessage) -> RelaxOutcome {
        if !self.is_neighbor(&update.sender_address) {
            tracing::warn!(
                sender = %update.sender_address,
                "advertisement from non-neighbor ignored"
            );
            return RelaxOutcome::Ignored;
        }

        let outcome = {
            let mut table = self.table.lock().await;
            relax(&mut table, &self.identity, &self.neighbors, update)
        };

        match &outcome {
            RelaxOutcome::Applied { changed } if !changed.is_empty() => {
                tracing::info!(
                    sender = %update.sender_address,
                    changed = changed.len(),
                    networks = ?changed,
                    "routing table updated"
                );
            }
            _ => {
                tracing::debug!(sender = %update.sender_address, "advertisement changed nothing");
            }
        }

        outcome
    }

    /// Build the outbound advertisement: snapshot under the lock, then
    /// summarize the copy after the lock is released.
    pub async fn advertisement(&self, strategy: SummaryStrategy) -> UpdateMessage {
        let snapshot = self.snapshot().await;
        let summarized = strategy.apply(&snapshot);
        UpdateMessage::new(self.identity.address.clone(), summarized.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripd_types::RouteEntry;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    const B: &str = "127.0.0.1:5001";

    fn router() -> Router {
        Router::new(
            RouterIdentity::new("127.0.0.1:5000", "10.0.0.0/24"),
            NeighborCosts::from([(B.to_string(), 1)]),
            Duration::from_secs(10),
        )
    }

    fn update(sender: &str, routes: &[(&str, u32)]) -> UpdateMessage {
        let table: BTreeMap<_, _> = routes
            .iter()
            .map(|(net, cost)| (net.to_string(), RouteEntry::new(*cost, *net)))
            .collect();
        UpdateMessage::new(sender, table)
    }

    #[tokio::test]
    async fn starts_with_seeded_table() {
        let router = router();
        let table = router.snapshot().await;
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("10.0.0.0/24").unwrap().cost, 0);
        assert_eq!(table.get(B).unwrap().next_hop, B);
    }

    #[tokio::test]
    async fn non_neighbor_update_is_ignored() {
        let router = router();
        let outcome = router
            .apply_update(&update("10.9.9.9:1", &[("10.1.0.0/24", 0)]))
            .await;
        assert!(outcome.is_ignored());
        assert_eq!(router.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn advertisement_is_summarized_copy() {
        let router = router();
        router
            .apply_update(&update(B, &[("10.1.0.0/25", 0), ("10.1.0.128/25", 2)]))
            .await;

        let msg = router.advertisement(SummaryStrategy::Pairwise).await;
        assert_eq!(msg.sender_address, "127.0.0.1:5000");
        assert_eq!(msg.routing_table.get("10.1.0.0/24"), Some(&RouteEntry::new(3, B)));

        // The live table still holds both halves.
        let live = router.snapshot().await;
        assert!(live.contains("10.1.0.0/25"));
        assert!(live.contains("10.1.0.128/25"));
        assert!(!live.contains("10.1.0.0/24"));
    }

    #[tokio::test]
    async fn concurrent_updates_are_serialized() {
        let router = Arc::new(router());
        let mut handles = Vec::new();
        for i in 0..32u32 {
            let router = Arc::clone(&router);
            handles.push(tokio::spawn(async move {
                let net = format!("10.2.{i}.0/24");
                router.apply_update(&update(B, &[(net.as_str(), i % 5)])).await;
                router.advertisement(SummaryStrategy::Lcp).await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(router.snapshot().await.len(), 2 + 32);
    }

    /// Records whether the table lock was held while any event was emitted.
    struct LockObserver {
        router: Arc<Router>,
        held_while_logging: Arc<AtomicBool>,
        events: Arc<AtomicUsize>,
    }

    impl<S: tracing::Subscriber> Layer<S> for LockObserver {
        fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.events.fetch_add(1, Ordering::SeqCst);
            if self.router.table.try_lock().is_err() {
                self.held_while_logging.store(true, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn update_logging_happens_outside_the_lock() {
        let router = Arc::new(router());
        let held = Arc::new(AtomicBool::new(false));
        let events = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(LockObserver {
            router: Arc::clone(&router),
            held_while_logging: Arc::clone(&held),
            events: Arc::clone(&events),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        router.apply_update(&update(B, &[("10.1.0.0/24", 0)])).await;
        router.apply_update(&update(B, &[("10.1.0.0/24", 0)])).await;
        router.apply_update(&update("10.9.9.9:1", &[("10.2.0.0/24", 0)])).await;

        assert!(events.load(Ordering::SeqCst) >= 3);
        assert!(!held.load(Ordering::SeqCst));
    }
}
