use std::collections::BTreeMap;

use proptest::prelude::*;

use ripd_routing::{
    relax, summarize_lcp, summarize_pairwise, NeighborCosts, RouterIdentity, RoutingTable,
};
use ripd_types::{address_to_int, int_to_address, Cidr, RouteEntry, UpdateMessage, INFINITY};

const ME: &str = "127.0.0.1:5000";
const MY_NET: &str = "10.255.0.0/24";
const NEIGHBORS: [&str; 3] = ["127.0.0.1:5001", "127.0.0.1:5002", "127.0.0.1:5003"];

fn neighbors(costs: &[u32]) -> NeighborCosts {
    NEIGHBORS
        .iter()
        .zip(costs)
        .map(|(addr, cost)| (addr.to_string(), *cost))
        .collect()
}

fn arb_update() -> impl Strategy<Value = UpdateMessage> {
    (
        0usize..NEIGHBORS.len(),
        prop::collection::btree_map(
            (0u32..16).prop_map(|n| format!("10.{n}.0.0/16")),
            0u32..40,
            0..8,
        ),
    )
        .prop_map(|(sender, routes)| {
            let table: BTreeMap<String, RouteEntry> = routes
                .into_iter()
                .map(|(net, cost)| {
                    (
                        net,
                        RouteEntry {
                            cost,
                            next_hop: String::new(),
                        },
                    )
                })
                .collect();
            UpdateMessage::new(NEIGHBORS[sender], table)
        })
}

fn arb_cidr_table() -> impl Strategy<Value = RoutingTable> {
    prop::collection::vec((any::<u32>(), 8u8..=30, 0u32..=16, 0usize..3), 0..24).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(addr, len, cost, hop)| {
                    let cidr = Cidr::new(addr, len).unwrap();
                    (cidr.to_string(), RouteEntry::new(cost, NEIGHBORS[hop]))
                })
                .collect()
        },
    )
}

proptest! {
    /// No sequence of relaxations pushes any cost past the ceiling.
    #[test]
    fn costs_never_exceed_infinity(
        costs in prop::collection::vec(0u32..=16, 3),
        updates in prop::collection::vec(arb_update(), 1..20),
    ) {
        let identity = RouterIdentity::new(ME, MY_NET);
        let neighbors = neighbors(&costs);
        let mut table = RoutingTable::seeded(MY_NET, &neighbors);
        for update in &updates {
            relax(&mut table, &identity, &neighbors, update);
            for (_, entry) in table.iter() {
                prop_assert!(entry.cost <= INFINITY);
            }
        }
        prop_assert_eq!(table.get(MY_NET), Some(&RouteEntry::new(0, MY_NET)));
    }

    /// Re-applying the last advertisement changes nothing.
    #[test]
    fn relaxation_is_idempotent(
        costs in prop::collection::vec(0u32..=16, 3),
        updates in prop::collection::vec(arb_update(), 1..10),
    ) {
        let identity = RouterIdentity::new(ME, MY_NET);
        let neighbors = neighbors(&costs);
        let mut table = RoutingTable::seeded(MY_NET, &neighbors);
        for update in &updates {
            relax(&mut table, &identity, &neighbors, update);
        }
        let last = updates.last().unwrap();
        let before = table.clone();
        let outcome = relax(&mut table, &identity, &neighbors, last);
        prop_assert_eq!(outcome.changed_count(), 0);
        prop_assert_eq!(table, before);
    }

    /// Whatever the current route, its source can always move the cost.
    #[test]
    fn authoritative_sender_always_wins(first in 0u32..16, second in 0u32..16) {
        let identity = RouterIdentity::new(ME, MY_NET);
        let neighbors = neighbors(&[1, 1, 1]);
        let mut table = RoutingTable::seeded(MY_NET, &neighbors);
        let net = "10.7.0.0/16".to_string();
        let msg = |cost| {
            UpdateMessage::new(
                NEIGHBORS[0],
                BTreeMap::from([(net.clone(), RouteEntry::new(cost, ""))]),
            )
        };
        relax(&mut table, &identity, &neighbors, &msg(first));
        relax(&mut table, &identity, &neighbors, &msg(second));
        prop_assert_eq!(table.get(&net).unwrap().cost, (second + 1).min(INFINITY));
    }

    /// Pairwise summarization never mutates its input and never grows it.
    #[test]
    fn pairwise_shrinks_or_keeps(table in arb_cidr_table()) {
        let before = table.clone();
        let out = summarize_pairwise(&table);
        prop_assert_eq!(&table, &before);
        prop_assert!(out.len() <= table.len());
    }

    /// LCP leaves the input alone and emits at most one prefix per next hop.
    #[test]
    fn lcp_one_prefix_per_next_hop(table in arb_cidr_table()) {
        let before = table.clone();
        let out = summarize_lcp(&table);
        prop_assert_eq!(&table, &before);
        for hop in NEIGHBORS {
            let count = out.iter().filter(|(_, entry)| entry.next_hop == hop).count();
            prop_assert!(count <= 1, "{} has {} prefixes", hop, count);
        }
    }
}

#[test]
fn lcp_example_three_slash_24s() {
    let table: RoutingTable = [("10.0.0.0/24", 2), ("10.0.1.0/24", 4), ("10.0.2.0/24", 1)]
        .into_iter()
        .map(|(net, cost)| (net.to_string(), RouteEntry::new(cost, NEIGHBORS[0])))
        .collect();
    let out = summarize_lcp(&table);
    assert_eq!(out.len(), 1);
    let (key, entry) = out.iter().next().unwrap();
    let summary: Cidr = key.parse().unwrap();
    for member in ["10.0.0.0", "10.0.1.0", "10.0.2.0"] {
        assert!(summary.contains(address_to_int(member).unwrap()));
    }
    assert_eq!(entry.cost, 4);
    assert_eq!(int_to_address(summary.base), "10.0.0.0");
}
