//! The routing table.

use std::collections::btree_map;
use std::collections::BTreeMap;

use ripd_types::{clamp_metric, Metric, RouteEntry};
use serde::{Deserialize, Serialize};

use crate::NeighborCosts;

/// Mapping from network key (CIDR prefix or bare `host:port`) to the best
/// known route.
///
/// Ordered so that iteration, summarization and JSON output are stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable {
    routes: BTreeMap<String, RouteEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Startup table: the administered network at cost 0, plus one entry per
    /// direct neighbor reached through itself at the configured link cost.
    pub fn seeded(own_network: &str, neighbors: &NeighborCosts) -> Self {
        let mut table = Self::new();
        table.upsert(own_network, RouteEntry::new(0, own_network));
        for (neighbor, cost) in neighbors {
            table.upsert(neighbor.as_str(), RouteEntry::new(*cost, neighbor.as_str()));
        }
        table
    }

    pub fn get(&self, network: &str) -> Option<&RouteEntry> {
        self.routes.get(network)
    }

    pub fn contains(&self, network: &str) -> bool {
        self.routes.contains_key(network)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, RouteEntry> {
        self.routes.iter()
    }

    /// Insert or replace the route for `network`. Returns `true` if the
    /// stored entry is different afterwards.
    pub fn upsert(&mut self, network: impl Into<String>, entry: RouteEntry) -> bool {
        let entry = RouteEntry {
            cost: clamp_metric(entry.cost),
            ..entry
        };
        match self.routes.entry(network.into()) {
            btree_map::Entry::Occupied(mut slot) => {
                if slot.get() == &entry {
                    false
                } else {
                    slot.insert(entry);
                    true
                }
            }
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Overwrite only the cost of an existing route.
    pub fn set_cost(&mut self, network: &str, cost: Metric) -> bool {
        match self.routes.get_mut(network) {
            Some(entry) if entry.cost != clamp_metric(cost) => {
                entry.cost = clamp_metric(cost);
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, network: &str) -> Option<RouteEntry> {
        self.routes.remove(network)
    }

    /// An owned point-in-time copy.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn into_inner(self) -> BTreeMap<String, RouteEntry> {
        self.routes
    }
}

impl FromIterator<(String, RouteEntry)> for RoutingTable {
    fn from_iter<I: IntoIterator<Item = (String, RouteEntry)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (network, entry) in iter {
            table.upsert(network, entry);
        }
        table
    }
}

impl<'a> IntoIterator for &'a RoutingTable {
    type Item = (&'a String, &'a RouteEntry);
    type IntoIter = btree_map::Iter<'a, String, RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
