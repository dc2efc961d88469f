//! ripd node: everything around the routing core that makes a running
//! router.
//!
//! - [`NodeConfig`]: TOML configuration plus the neighbor CSV loader
//! - [`UpdateScheduler`]: periodic summarized advertisement to neighbors
//! - [`HttpTransport`]: JSON-over-HTTP delivery behind the [`Transport`] trait
//! - [`RouterNode`]: owns the shared router, HTTP server and scheduler

pub mod config;
pub mod error;
pub mod logging;
pub mod neighbors;
pub mod node;
pub mod scheduler;
pub mod transport;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use neighbors::{load_neighbors_csv, parse_neighbors_csv};
pub use node::RouterNode;
pub use ripd_routing::SummaryStrategy;
pub use scheduler::{AdvertisementReport, UpdateScheduler};
pub use transport::{HttpTransport, Transport, TransportError};
