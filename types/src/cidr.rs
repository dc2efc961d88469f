//! IPv4 address and CIDR prefix arithmetic.
//!
//! Addresses are handled as host-order `u32` values. The summarizers work on
//! the literal address of each route key, so [`Cidr`] keeps host bits exactly
//! as written instead of normalizing them away.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::CidrError;

/// Parse a dotted-quad IPv4 address into its 32-bit integer value.
///
/// Octets are read as plain decimal, so leading zeros are accepted
/// (`010.0.0.1` is `10.0.0.1`).
pub fn address_to_int(ip: &str) -> Result<u32, CidrError> {
    let invalid = || CidrError::InvalidAddress(ip.to_string());
    let mut octets = [0u8; 4];
    let mut parts = ip.trim().split('.');
    for octet in &mut octets {
        let part = parts.next().ok_or_else(invalid)?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        *octet = part.parse().map_err(|_| invalid())?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(u32::from(Ipv4Addr::from(octets)))
}

/// Render a 32-bit integer as a dotted-quad IPv4 address.
pub fn int_to_address(n: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (n >> 24) & 0xFF,
        (n >> 16) & 0xFF,
        (n >> 8) & 0xFF,
        n & 0xFF
    )
}

/// Network mask for a prefix length. `/0` yields an all-zero mask.
///
/// Lengths above 32 saturate to a full mask.
pub fn mask_for(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n if n >= 32 => u32::MAX,
        n => u32::MAX << (32 - u32::from(n)),
    }
}

/// Whether a routing-table key names a CIDR network rather than a bare
/// `host:port` peer.
pub fn is_cidr_key(key: &str) -> bool {
    key.contains('/')
}

/// An IPv4 prefix in `a.b.c.d/n` notation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cidr {
    /// Address as written, host bits included.
    pub base: u32,
    pub prefix_len: u8,
}

impl Cidr {
    pub fn new(base: u32, prefix_len: u8) -> Result<Self, CidrError> {
        if prefix_len > 32 {
            return Err(CidrError::InvalidPrefixLength(format!(
                "{}/{}",
                int_to_address(base),
                prefix_len
            )));
        }
        Ok(Self { base, prefix_len })
    }

    pub fn mask(&self) -> u32 {
        mask_for(self.prefix_len)
    }

    /// The network address with host bits cleared.
    pub fn network(&self) -> u32 {
        self.base & self.mask()
    }

    /// Size of the address block covered by this prefix.
    pub fn block_size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len))
    }

    /// Whether `addr` falls inside this prefix.
    pub fn contains(&self, addr: u32) -> bool {
        addr & self.mask() == self.network()
    }

    /// The supernet one bit shorter, if this and `other` are its two halves.
    ///
    /// Both prefixes must have the same length and their addresses must
    /// differ in exactly the bit that the shorter prefix drops.
    pub fn sibling_supernet(&self, other: &Cidr) -> Option<Cidr> {
        if self.prefix_len != other.prefix_len || self.prefix_len == 0 {
            return None;
        }
        if u64::from(self.base ^ other.base) != self.block_size() {
            return None;
        }
        let prefix_len = self.prefix_len - 1;
        Some(Cidr {
            base: self.base & mask_for(prefix_len),
            prefix_len,
        })
    }
}

impl FromStr for Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ip, len) = s
            .split_once('/')
            .ok_or_else(|| CidrError::MissingPrefix(s.to_string()))?;
        let base = address_to_int(ip)?;
        let prefix_len = len
            .trim()
            .parse::<u8>()
            .map_err(|_| CidrError::InvalidPrefixLength(s.to_string()))?;
        if prefix_len > 32 {
            return Err(CidrError::InvalidPrefixLength(s.to_string()));
        }
        Ok(Self { base, prefix_len })
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", int_to_address(self.base), self.prefix_len)
    }
}
