//! IPv4 prefix type used for every CIDR field.
//!
//! Provides [`Ipv4`] plus the mask helpers needed to validate address ranges.

use crate::error::{InfraError, Result};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use azure_infra_topology::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32> {
    if len > MAX_LENGTH {
        return Err(InfraError::InvalidCidr(format!(
            "network length /{len} is too long"
        )));
    }
    let right_len = MAX_LENGTH - len;
    let mask = ((u32::MAX as u64) >> right_len) << right_len;
    Ok(mask as u32)
}

/// IPv4 address with prefix length, serialised as `a.b.c.d/n`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ipv4 {
    /// The IPv4 address (host bits may be set).
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Ipv4 {
    /// Parse a CIDR string (e.g. "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| InfraError::InvalidCidr(format!("'{addr_cidr}' has no prefix length")))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| InfraError::InvalidCidr(format!("invalid address '{addr}' in '{addr_cidr}'")))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| InfraError::InvalidCidr(format!("invalid mask '{mask}' in '{addr_cidr}'")))?;
        // validates the length
        get_cidr_mask(mask)?;
        Ok(Ipv4 { addr, mask })
    }

    fn mask_bits(&self) -> u32 {
        // mask <= MAX_LENGTH holds for every constructed value
        get_cidr_mask(self.mask).unwrap_or(u32::MAX)
    }

    /// Lowest (network) address of the prefix.
    pub fn lo(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.mask_bits())
    }

    /// Highest (broadcast) address of the prefix.
    pub fn hi(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) | !self.mask_bits())
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.lo() <= addr && addr <= self.hi()
    }

    /// True if the two prefixes share at least one address.
    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl FromStr for Ipv4 {
    type Err = InfraError;

    fn from_str(s: &str) -> Result<Ipv4> {
        Ipv4::new(s)
    }
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(de::Error::custom)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
