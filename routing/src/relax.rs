//! Bellman-Ford relaxation of a neighbor's advertisement into the local table.

use ripd_types::{clamp_metric, RouteEntry, UpdateMessage};

use crate::router::RouterIdentity;
use crate::table::RoutingTable;
use crate::NeighborCosts;

/// What happened when an advertisement was merged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelaxOutcome {
    /// The sender is not a configured direct neighbor; nothing was read.
    Ignored,
    /// The advertisement was processed. `changed` lists every network whose
    /// entry differs afterwards.
    Applied { changed: Vec<String> },
}

impl RelaxOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    pub fn changed_count(&self) -> usize {
        match self {
            Self::Ignored => 0,
            Self::Applied { changed } => changed.len(),
        }
    }
}

/// Merge `update` into `table`.
///
/// For every advertised network other than our own address or administered
/// network, the candidate cost is `link_cost(sender) + advertised_cost`,
/// clamped to `INFINITY`. The candidate is installed when the network is
/// unknown, when it is strictly cheaper than the current route, or when the
/// current route already goes through the sender. In the last case the cost
/// is overwritten even if it got worse, so that withdrawals propagate.
pub fn relax(
    table: &mut RoutingTable,
    identity: &RouterIdentity,
    neighbors: &NeighborCosts,
    update: &UpdateMessage,
) -> RelaxOutcome {
    let sender = update.sender_address.as_str();
    let Some(&link_cost) = neighbors.get(sender) else {
        return RelaxOutcome::Ignored;
    };

    let mut changed = Vec::new();
    for (network, advertised) in &update.routing_table {
        if identity.is_self(network) {
            continue;
        }

        let new_cost = clamp_metric(link_cost.saturating_add(advertised.cost));
        let updated = match table.get(network) {
            None => table.upsert(network.as_str(), RouteEntry::new(new_cost, sender)),
            Some(current) if new_cost < current.cost => {
                table.upsert(network.as_str(), RouteEntry::new(new_cost, sender))
            }
            Some(current) if current.next_hop == sender => table.set_cost(network, new_cost),
            Some(_) => false,
        };

        if updated {
            changed.push(network.clone());
        }
    }

    RelaxOutcome::Applied { changed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripd_types::INFINITY;
    use std::collections::BTreeMap;

    const ME: &str = "127.0.0.1:5000";
    const MY_NET: &str = "10.0.0.0/24";
    const B: &str = "127.0.0.1:5001";
    const C: &str = "127.0.0.1:5002";

    fn identity() -> RouterIdentity {
        RouterIdentity::new(ME, MY_NET)
    }

    fn neighbors() -> NeighborCosts {
        NeighborCosts::from([(B.to_string(), 1), (C.to_string(), 4)])
    }

    fn setup() -> RoutingTable {
        RoutingTable::seeded(MY_NET, &neighbors())
    }

    fn update(sender: &str, routes: &[(&str, u32)]) -> UpdateMessage {
        let table: BTreeMap<_, _> = routes
            .iter()
            .map(|(net, cost)| (net.to_string(), RouteEntry::new(*cost, *net)))
            .collect();
        UpdateMessage::new(sender, table)
    }

    #[test]
    fn unknown_sender_is_ignored() {
        let mut table = setup();
        let before = table.clone();
        let outcome = relax(
            &mut table,
            &identity(),
            &neighbors(),
            &update("192.168.0.9:5000", &[("10.9.0.0/24", 0)]),
        );
        assert!(outcome.is_ignored());
        assert_eq!(table, before);
    }

    #[test]
    fn learns_unknown_network_through_sender() {
        let mut table = setup();
        let outcome = relax(
            &mut table,
            &identity(),
            &neighbors(),
            &update(B, &[("10.0.1.0/24", 0)]),
        );
        assert_eq!(
            outcome,
            RelaxOutcome::Applied {
                changed: vec!["10.0.1.0/24".into()]
            }
        );
        assert_eq!(table.get("10.0.1.0/24"), Some(&RouteEntry::new(1, B)));
    }

    #[test]
    fn strictly_better_path_replaces_route() {
        let mut table = setup();
        relax(&mut table, &identity(), &neighbors(), &update(C, &[("10.0.2.0/24", 0)]));
        assert_eq!(table.get("10.0.2.0/24"), Some(&RouteEntry::new(4, C)));

        relax(&mut table, &identity(), &neighbors(), &update(B, &[("10.0.2.0/24", 1)]));
        assert_eq!(table.get("10.0.2.0/24"), Some(&RouteEntry::new(2, B)));
    }

    #[test]
    fn worse_path_from_other_neighbor_is_kept_out() {
        let mut table = setup();
        relax(&mut table, &identity(), &neighbors(), &update(B, &[("10.0.2.0/24", 1)]));
        let outcome = relax(&mut table, &identity(), &neighbors(), &update(C, &[("10.0.2.0/24", 1)]));
        assert_eq!(outcome.changed_count(), 0);
        assert_eq!(table.get("10.0.2.0/24"), Some(&RouteEntry::new(2, B)));
    }

    #[test]
    fn equal_cost_from_other_neighbor_does_not_flap() {
        let mut table = setup();
        relax(&mut table, &identity(), &neighbors(), &update(C, &[("10.0.2.0/24", 0)]));
        relax(&mut table, &identity(), &neighbors(), &update(B, &[("10.0.2.0/24", 3)]));
        assert_eq!(table.get("10.0.2.0/24"), Some(&RouteEntry::new(4, C)));
    }

    #[test]
    fn authoritative_sender_can_raise_cost() {
        let mut table = setup();
        relax(&mut table, &identity(), &neighbors(), &update(B, &[("10.0.1.0/24", 0)]));
        let outcome = relax(&mut table, &identity(), &neighbors(), &update(B, &[("10.0.1.0/24", 6)]));
        assert_eq!(outcome.changed_count(), 1);
        assert_eq!(table.get("10.0.1.0/24"), Some(&RouteEntry::new(7, B)));
    }

    #[test]
    fn withdrawal_propagates_to_infinity() {
        let mut table = setup();
        relax(&mut table, &identity(), &neighbors(), &update(B, &[("10.0.1.0/24", 0)]));
        relax(
            &mut table,
            &identity(),
            &neighbors(),
            &update(B, &[("10.0.1.0/24", INFINITY)]),
        );
        assert_eq!(table.get("10.0.1.0/24").unwrap().cost, INFINITY);
        assert_eq!(table.get("10.0.1.0/24").unwrap().next_hop, B);
    }

    #[test]
    fn costs_clamp_at_infinity() {
        let mut table = setup();
        relax(
            &mut table,
            &identity(),
            &neighbors(),
            &update(C, &[("10.0.3.0/24", 14), ("10.0.4.0/24", u32::MAX)]),
        );
        assert_eq!(table.get("10.0.3.0/24").unwrap().cost, INFINITY);
        assert_eq!(table.get("10.0.4.0/24").unwrap().cost, INFINITY);
    }

    #[test]
    fn own_network_and_address_are_never_learned() {
        let mut table = setup();
        let outcome = relax(
            &mut table,
            &identity(),
            &neighbors(),
            &update(B, &[(MY_NET, 0), (ME, 1)]),
        );
        assert_eq!(outcome.changed_count(), 0);
        assert_eq!(table.get(MY_NET), Some(&RouteEntry::new(0, MY_NET)));
        assert!(!table.contains(ME));
    }

    #[test]
    fn repeated_advertisement_is_a_fixed_point() {
        let mut table = setup();
        let msg = update(B, &[("10.0.1.0/24", 0), ("10.0.5.0/24", 3), (C, 1)]);
        let first = relax(&mut table, &identity(), &neighbors(), &msg);
        assert!(first.changed_count() > 0);
        let snapshot = table.clone();

        let second = relax(&mut table, &identity(), &neighbors(), &msg);
        assert_eq!(second.changed_count(), 0);
        assert_eq!(table, snapshot);
    }

    #[test]
    fn neighbor_route_can_improve_through_another_neighbor() {
        let mut table = setup();
        relax(&mut table, &identity(), &neighbors(), &update(B, &[(C, 1)]));
        assert_eq!(table.get(C), Some(&RouteEntry::new(2, B)));
    }
}
