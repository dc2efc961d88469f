//! Neighbor list loading from CSV.
//!
//! The file has a header row naming an address column (`neighbor`, or the
//! legacy `vizinho`) and a cost column (`cost`, or `custo`). Other columns
//! are ignored; blank lines are skipped. Fields may be wrapped in double
//! quotes, but a quoted field cannot itself contain a comma.
//!
//! ```text
//! neighbor,cost
//! 127.0.0.1:5001,1
//! 127.0.0.1:5002,4
//! ```

use std::path::Path;

use ripd_routing::NeighborCosts;
use ripd_types::Metric;

use crate::NodeError;

const ADDRESS_COLUMNS: [&str; 2] = ["neighbor", "vizinho"];
const COST_COLUMNS: [&str; 2] = ["cost", "custo"];

/// Read and parse a neighbor CSV file.
pub fn load_neighbors_csv(path: &Path) -> Result<NeighborCosts, NodeError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        NodeError::NeighborFile(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_neighbors_csv(&content)
}

/// Parse neighbor CSV text. A repeated address keeps its last cost.
pub fn parse_neighbors_csv(content: &str) -> Result<NeighborCosts, NodeError> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| NodeError::NeighborFile("file is empty".into()))?;
    let columns: Vec<String> = header
        .split(',')
        .map(|c| unquote(c.trim_start_matches('\u{feff}')).to_ascii_lowercase())
        .collect();
    let find = |names: &[&str]| columns.iter().position(|c| names.contains(&c.as_str()));
    let address_col = find(&ADDRESS_COLUMNS).ok_or_else(|| {
        NodeError::NeighborFile("header has no 'neighbor' column".into())
    })?;
    let cost_col = find(&COST_COLUMNS)
        .ok_or_else(|| NodeError::NeighborFile("header has no 'cost' column".into()))?;

    let mut neighbors = NeighborCosts::new();
    for (index, line) in lines {
        let line_no = index + 1;
        let fields: Vec<&str> = line.split(',').map(unquote).collect();
        let address = fields
            .get(address_col)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| NodeError::NeighborFile(format!("line {line_no}: missing address")))?;
        let cost = fields
            .get(cost_col)
            .ok_or_else(|| NodeError::NeighborFile(format!("line {line_no}: missing cost")))?
            .parse::<Metric>()
            .map_err(|e| NodeError::NeighborFile(format!("line {line_no}: bad cost: {e}")))?;
        neighbors.insert(address.to_string(), cost);
    }

    Ok(neighbors)
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(field)
}
