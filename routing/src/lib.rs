//! Distance-vector routing core.
//!
//! - [`RoutingTable`]: the `{destination -> (cost, next_hop)}` map.
//! - [`relax`]: Bellman-Ford merge of a neighbor's advertisement.
//! - [`summarize`]: pairwise and longest-common-prefix route aggregation,
//!   always producing a fresh table.
//! - [`Router`]: the single lock-guarded table shared by the update
//!   scheduler and the inbound handler.

pub mod relax;
pub mod router;
pub mod summarize;
pub mod table;

use std::collections::BTreeMap;

use ripd_types::Metric;

/// Direct neighbors and the cost of the link to each.
pub type NeighborCosts = BTreeMap<String, Metric>;

pub use relax::{relax, RelaxOutcome};
pub use router::{Router, RouterIdentity};
pub use summarize::{covering_prefix, summarize_lcp, summarize_pairwise, SummaryStrategy};
pub use table::RoutingTable;
