//! Fundamental types for the ripd router.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! IPv4/CIDR arithmetic, route entries and metrics, and the update message
//! exchanged between neighbors.

pub mod cidr;
pub mod error;
pub mod message;
pub mod route;

pub use cidr::{address_to_int, int_to_address, is_cidr_key, mask_for, Cidr};
pub use error::CidrError;
pub use message::UpdateMessage;
pub use route::{clamp_metric, Metric, RouteEntry, INFINITY};
