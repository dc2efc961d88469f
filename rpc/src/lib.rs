//! HTTP surface of a ripd node.
//!
//! Provides endpoints for:
//! - `POST /receive_update`: a neighbor's distance-vector advertisement
//! - `GET /routes`: the live routing table plus node identity, for diagnostics

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{app, RpcServer};
