//! Node configuration with TOML file support.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ripd_routing::{NeighborCosts, SummaryStrategy};
use ripd_types::{Cidr, INFINITY};

use crate::logging::LogFormat;
use crate::neighbors::load_neighbors_csv;
use crate::NodeError;

/// Configuration for a ripd node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Call [`NodeConfig::validate`]
/// before use; the daemon does this on startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This node's `host:port` identity, as its neighbors know it.
    #[serde(default)]
    pub address: String,

    /// The network this node administers, in CIDR notation.
    #[serde(default)]
    pub network: String,

    /// Optional CSV file with more neighbors; its rows override `neighbors`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbors_file: Option<PathBuf>,

    /// Interface the HTTP server binds to.
    #[serde(default = "default_listen_host")]
    pub listen_host: IpAddr,

    /// Port the HTTP server binds to.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Seconds between periodic advertisements.
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,

    /// Per-neighbor delivery timeout, in seconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,

    /// How the table is compressed before it is advertised.
    #[serde(default)]
    pub summarization: SummaryStrategy,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Direct neighbors and their link costs. Kept last so it serializes as
    /// a trailing TOML table.
    #[serde(default)]
    pub neighbors: NeighborCosts,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_listen_port() -> u16 {
    5000
}

fn default_update_interval() -> u64 {
    10
}

fn default_send_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Merge the rows of `neighbors_file`, if any, into `neighbors`.
    pub fn load_neighbors_file(&mut self) -> Result<(), NodeError> {
        if let Some(path) = &self.neighbors_file {
            let from_file = load_neighbors_csv(path)?;
            self.neighbors.extend(from_file);
        }
        Ok(())
    }

    /// Check everything the node relies on at runtime.
    pub fn validate(&self) -> Result<(), NodeError> {
        validate_peer_address(&self.address)
            .map_err(|e| NodeError::Config(format!("address: {e}")))?;

        if self.network.is_empty() {
            return Err(NodeError::Config("network is required".into()));
        }
        self.network.parse::<Cidr>()?;

        for (neighbor, cost) in &self.neighbors {
            validate_peer_address(neighbor)
                .map_err(|e| NodeError::Config(format!("neighbor {neighbor}: {e}")))?;
            if neighbor == &self.address {
                return Err(NodeError::Config(format!(
                    "neighbor {neighbor} is this node's own address"
                )));
            }
            if *cost > INFINITY {
                return Err(NodeError::Config(format!(
                    "neighbor {neighbor}: cost {cost} exceeds {INFINITY}"
                )));
            }
        }

        if self.update_interval_secs == 0 {
            return Err(NodeError::Config("update_interval_secs must be > 0".into()));
        }
        if self.send_timeout_secs == 0 {
            return Err(NodeError::Config("send_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.listen_port)
    }
}

/// A neighbor key must look like `host:port` with a numeric port.
fn validate_peer_address(address: &str) -> Result<(), String> {
    if address.is_empty() {
        return Err("is required".into());
    }
    if address.contains('/') {
        return Err(format!("'{address}' looks like a network, expected host:port"));
    }
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| format!("'{address}' is missing a port"))?;
    if host.is_empty() {
        return Err(format!("'{address}' is missing a host"));
    }
    port.parse::<u16>()
        .map_err(|_| format!("'{address}' has an invalid port"))?;
    Ok(())
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            network: String::new(),
            neighbors_file: None,
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            update_interval_secs: default_update_interval(),
            send_timeout_secs: default_send_timeout(),
            summarization: SummaryStrategy::default(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            neighbors: NeighborCosts::new(),
        }
    }
}
