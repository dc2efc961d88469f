//! Route entries and the distance metric.

use serde::{Deserialize, Serialize};

/// Hop-count style distance metric.
pub type Metric = u32;

/// Metric ceiling. Any cost at or above this value means "unreachable".
pub const INFINITY: Metric = 16;

/// Clamp a computed cost to the metric ceiling.
pub fn clamp_metric(cost: Metric) -> Metric {
    cost.min(INFINITY)
}

/// One row of a routing table: how much it costs to reach a destination and
/// through which neighbor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub cost: Metric,
    /// Advertisers may omit this; relaxation never reads it.
    #[serde(default)]
    pub next_hop: String,
}

impl RouteEntry {
    pub fn new(cost: Metric, next_hop: impl Into<String>) -> Self {
        Self {
            cost: clamp_metric(cost),
            next_hop: next_hop.into(),
        }
    }
}
