//! The update message neighbors exchange.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::route::RouteEntry;

/// A distance-vector advertisement: the sender's identity and its
/// (possibly summarized) table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMessage {
    pub sender_address: String,
    pub routing_table: BTreeMap<String, RouteEntry>,
}

impl UpdateMessage {
    pub fn new(
        sender_address: impl Into<String>,
        routing_table: BTreeMap<String, RouteEntry>,
    ) -> Self {
        Self {
            sender_address: sender_address.into(),
            routing_table,
        }
    }
}
