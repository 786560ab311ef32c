//! Internal network topology model.
//!
//! A cluster network is exactly one of three shapes:
//! - [`RegionalTopology`] - one subnet, no zones, availability-set eligible
//! - [`SingleSubnetZonalTopology`] - one subnet shared by all zones
//! - [`ZonalTopology`] - one subnet per declared zone
//!
//! [`Topology`] carries exactly one of them. Downstream code switches on
//! [`Topology::kind`] instead of poking at the variants.

use super::Ipv4;
use crate::error::{InfraError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public IP assigned to a NAT gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicIpReference {
    pub name: String,
    pub resource_group: String,
    pub zone: Option<i32>,
}

/// NAT gateway attached to a subnet.
///
/// `None`, `Some(enabled: false)` and `Some(enabled: true)` are three distinct
/// states. Only the last one produces a NAT gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NatGatewayConfig {
    pub enabled: bool,
    pub idle_connection_timeout_minutes: Option<i32>,
    pub zone: Option<i32>,
    pub ip_addresses: Vec<PublicIpReference>,
}

/// Returns the NAT gateway config only if it is present and enabled.
pub fn active_nat_gateway(nat: Option<&NatGatewayConfig>) -> Option<&NatGatewayConfig> {
    nat.filter(|nat| nat.enabled)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionalTopology {
    pub cidr: Ipv4,
    pub service_endpoints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSubnetZonalTopology {
    pub cidr: Ipv4,
    pub service_endpoints: Vec<String>,
    pub nat_gateway: Option<NatGatewayConfig>,
}

/// A zone of a [`ZonalTopology`] with its own subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Zone number as used by the cloud provider.
    pub name: i32,
    pub cidr: Ipv4,
    pub service_endpoints: Vec<String>,
    pub nat_gateway: Option<NatGatewayConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonalTopology {
    pub zones: Vec<Zone>,
    pub internal_cidr: Option<Ipv4>,
}

/// Discriminant of [`Topology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyKind {
    #[serde(rename = "regional")]
    Regional,
    #[serde(rename = "zonalSingleSubnet")]
    SingleSubnetZonal,
    #[serde(rename = "zonal")]
    Zonal,
}

impl TopologyKind {
    pub const ALL: [TopologyKind; 3] = [
        TopologyKind::Regional,
        TopologyKind::SingleSubnetZonal,
        TopologyKind::Zonal,
    ];

    /// Everything but [`TopologyKind::Regional`] is zone aware.
    pub fn is_zoned(&self) -> bool {
        !matches!(self, TopologyKind::Regional)
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TopologyKind::Regional => "Regional",
            TopologyKind::SingleSubnetZonal => "SingleSubnetZonal",
            TopologyKind::Zonal => "Zonal",
        };
        f.write_str(name)
    }
}

/// Network topology of a cluster. Exactly one shape is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    Regional(RegionalTopology),
    SingleSubnetZonal(SingleSubnetZonalTopology),
    Zonal(ZonalTopology),
}

impl Topology {
    /// Build a topology from optional parts as found in versioned documents.
    ///
    /// Fails with [`InfraError::InvalidTopology`] unless exactly one part is set.
    pub fn from_parts(
        regional: Option<RegionalTopology>,
        single_subnet_zonal: Option<SingleSubnetZonalTopology>,
        zonal: Option<ZonalTopology>,
    ) -> Result<Topology> {
        let topology = match (regional, single_subnet_zonal, zonal) {
            (Some(regional), None, None) => Topology::Regional(regional),
            (None, Some(single), None) => Topology::SingleSubnetZonal(single),
            (None, None, Some(zonal)) => Topology::Zonal(zonal),
            (None, None, None) => {
                return Err(InfraError::InvalidTopology(
                    "no network topology is set".to_string(),
                ))
            }
            _ => {
                return Err(InfraError::InvalidTopology(
                    "more than one network topology is set".to_string(),
                ))
            }
        };
        topology.validate()?;
        Ok(topology)
    }

    pub fn regional(cidr: Ipv4, service_endpoints: Vec<String>) -> Topology {
        Topology::Regional(RegionalTopology {
            cidr,
            service_endpoints,
        })
    }

    pub fn single_subnet_zonal(
        cidr: Ipv4,
        service_endpoints: Vec<String>,
        nat_gateway: Option<NatGatewayConfig>,
    ) -> Topology {
        Topology::SingleSubnetZonal(SingleSubnetZonalTopology {
            cidr,
            service_endpoints,
            nat_gateway,
        })
    }

    /// Build a zonal topology, validating the zone list.
    pub fn zonal(zones: Vec<Zone>, internal_cidr: Option<Ipv4>) -> Result<Topology> {
        let topology = Topology::Zonal(ZonalTopology {
            zones,
            internal_cidr,
        });
        topology.validate()?;
        Ok(topology)
    }

    pub fn kind(&self) -> TopologyKind {
        match self {
            Topology::Regional(_) => TopologyKind::Regional,
            Topology::SingleSubnetZonal(_) => TopologyKind::SingleSubnetZonal,
            Topology::Zonal(_) => TopologyKind::Zonal,
        }
    }

    /// Check the invariants a value built directly from the variants may break.
    pub fn validate(&self) -> Result<()> {
        let zonal = match self {
            Topology::Zonal(zonal) => zonal,
            _ => return Ok(()),
        };
        if zonal.zones.is_empty() {
            return Err(InfraError::InvalidTopology(
                "zonal topology declares no zones".to_string(),
            ));
        }
        if let Some(name) = zonal.zones.iter().map(|z| z.name).duplicates().next() {
            return Err(InfraError::InvalidTopology(format!(
                "zone {name} is declared more than once"
            )));
        }
        for (a, b) in zonal.zones.iter().tuple_combinations() {
            if a.cidr.overlaps(&b.cidr) {
                return Err(InfraError::InvalidTopology(format!(
                    "CIDR {} of zone {} overlaps CIDR {} of zone {}",
                    a.cidr, a.name, b.cidr, b.name
                )));
            }
        }
        Ok(())
    }

    /// The single worker subnet CIDR; `None` for [`Topology::Zonal`].
    pub fn subnet_cidr(&self) -> Option<Ipv4> {
        match self {
            Topology::Regional(regional) => Some(regional.cidr),
            Topology::SingleSubnetZonal(single) => Some(single.cidr),
            Topology::Zonal(_) => None,
        }
    }

    /// Declared zones; empty unless zonal.
    pub fn zones(&self) -> &[Zone] {
        match self {
            Topology::Zonal(zonal) => &zonal.zones,
            _ => &[],
        }
    }

    /// Number of worker subnets this topology creates.
    pub fn subnet_count(&self) -> usize {
        match self {
            Topology::Zonal(zonal) => zonal.zones.len(),
            _ => 1,
        }
    }
}
