//! Route summarization for outbound advertisements.
//!
//! Both summarizers read a table and return a new one. Keys that are not
//! CIDR prefixes (bare `host:port` peers), or that fail to parse as one, are
//! copied through untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ripd_types::{is_cidr_key, Cidr, Metric, RouteEntry};
use serde::{Deserialize, Serialize};

use crate::table::RoutingTable;

/// Shortest prefix the longest-common-prefix summarizer will emit.
pub const MIN_SUMMARY_PREFIX: u8 = 8;

/// How a table is compressed before it is advertised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStrategy {
    /// Merge exact sibling halves, one pass.
    #[default]
    Pairwise,
    /// One covering prefix per next hop.
    Lcp,
    /// Advertise the table verbatim.
    None,
}

impl SummaryStrategy {
    pub fn apply(&self, table: &RoutingTable) -> RoutingTable {
        match self {
            Self::Pairwise => summarize_pairwise(table),
            Self::Lcp => summarize_lcp(table),
            Self::None => table.snapshot(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pairwise => "pairwise",
            Self::Lcp => "lcp",
            Self::None => "none",
        }
    }
}

impl fmt::Display for SummaryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pairwise" => Ok(Self::Pairwise),
            "lcp" | "non-contiguous" => Ok(Self::Lcp),
            "none" | "off" => Ok(Self::None),
            other => Err(format!(
                "unknown summarization strategy '{other}' (expected pairwise, lcp or none)"
            )),
        }
    }
}

fn parse_key(key: &str) -> Option<Cidr> {
    if !is_cidr_key(key) {
        return None;
    }
    key.parse().ok()
}

/// Replace every pair of sibling prefixes that share a next hop with their
/// common supernet, priced at the worse of the two costs.
///
/// Pairs are matched over all unordered pairs in key order. A prefix consumed
/// by one merge is not paired again, and summaries produced in this pass are
/// not themselves candidates, so four adjacent /26s become two /25s rather
/// than one /24.
pub fn summarize_pairwise(table: &RoutingTable) -> RoutingTable {
    let candidates: Vec<(&String, Cidr, &RouteEntry)> = table
        .iter()
        .filter_map(|(key, entry)| parse_key(key).map(|cidr| (key, cidr, entry)))
        .collect();

    let mut consumed = vec![false; candidates.len()];
    let mut summaries = Vec::new();

    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            if consumed[i] || consumed[j] {
                continue;
            }
            let (_, a, entry_a) = candidates[i];
            let (_, b, entry_b) = candidates[j];
            if entry_a.next_hop != entry_b.next_hop {
                continue;
            }
            if let Some(supernet) = a.sibling_supernet(&b) {
                summaries.push((
                    supernet.to_string(),
                    RouteEntry::new(entry_a.cost.max(entry_b.cost), entry_a.next_hop.as_str()),
                ));
                consumed[i] = true;
                consumed[j] = true;
            }
        }
    }

    let mut summarized = table.snapshot();
    for ((key, _, _), used) in candidates.iter().zip(&consumed) {
        if *used {
            summarized.remove(key);
        }
    }
    for (key, entry) in summaries {
        summarized.upsert(key, entry);
    }
    summarized
}

/// Smallest prefix (but never shorter than `/8`) whose leading bits cover
/// both `low` and `high`.
///
/// The base is `low` with the differing low-order bits cleared. When the /8
/// floor applies the base is still masked by the full spread, so the result
/// may carry host bits below the advertised length.
pub fn covering_prefix(low: u32, high: u32) -> Cidr {
    let shift = u32::BITS - (low ^ high).leading_zeros();
    let prefix_len = (u32::BITS - shift).max(u32::from(MIN_SUMMARY_PREFIX)) as u8;
    let base = low & u32::MAX.checked_shl(shift).unwrap_or(0);
    Cidr { base, prefix_len }
}

/// Collapse all prefixes that share a next hop into one covering prefix,
/// priced at the group's worst cost.
///
/// Members need not be contiguous, so the summary may cover address space
/// none of them announced. A next hop with a single prefix keeps it as is.
/// Groups are emitted in next-hop order; if two groups land on the same
/// summary key the later one wins.
pub fn summarize_lcp(table: &RoutingTable) -> RoutingTable {
    let mut summarized = RoutingTable::new();
    let mut groups: BTreeMap<&str, Vec<(&String, u32, Metric)>> = BTreeMap::new();

    for (key, entry) in table {
        match parse_key(key) {
            Some(cidr) => groups
                .entry(entry.next_hop.as_str())
                .or_default()
                .push((key, cidr.base, entry.cost)),
            None => {
                summarized.upsert(key.as_str(), entry.clone());
            }
        }
    }

    for (next_hop, members) in groups {
        if let [(key, _, cost)] = members.as_slice() {
            summarized.upsert(key.as_str(), RouteEntry::new(*cost, next_hop));
            continue;
        }

        let low = members.iter().map(|(_, addr, _)| *addr).min().unwrap_or(0);
        let high = members.iter().map(|(_, addr, _)| *addr).max().unwrap_or(0);
        let cost = members.iter().map(|(_, _, cost)| *cost).max().unwrap_or(0);

        let summary = covering_prefix(low, high);
        summarized.upsert(summary.to_string(), RouteEntry::new(cost, next_hop));
    }

    summarized
}
