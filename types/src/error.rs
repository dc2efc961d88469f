//! Error types for address and prefix parsing.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("invalid prefix length in {0}")]
    InvalidPrefixLength(String),

    #[error("missing '/' in network {0}")]
    MissingPrefix(String),
}
