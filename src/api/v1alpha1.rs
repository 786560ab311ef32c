//! `v1alpha1` documents.
//!
//! The oldest generation. The network is one worker CIDR plus a `zoned` flag,
//! which selects between the regional and the single-subnet zonal topology.
//! There is no way to express one subnet per zone, so converting a zonal
//! configuration or status into this generation fails.

use super::{ApiVersion, TypeMeta, KIND_INFRASTRUCTURE_CONFIG, KIND_INFRASTRUCTURE_STATUS};
use crate::error::{InfraError, Result};
use crate::models::{self, Ipv4, Topology, TopologyKind};
use serde::{Deserialize, Serialize};

pub use crate::models::{
    AvailabilitySet, IdentityConfig, IdentityStatus, Purpose, ResourceGroup, RouteTable,
    SecurityGroup, VNetStatus,
};

/// VNet reference. Name and resource group together select an existing VNet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VNet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<Ipv4>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpReference {
    pub name: String,
    pub resource_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatGatewayConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_connection_timeout_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<PublicIpReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(default)]
    pub vnet: VNet,
    /// CIDR of the worker subnet.
    pub workers: Ipv4,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_endpoints: Vec<String>,
    /// Only honoured when the configuration is zoned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_gateway: Option<NatGatewayConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceGroup>,
    pub networks: NetworkConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityConfig>,
    #[serde(default)]
    pub zoned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub name: String,
    pub purpose: Purpose,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkStatus {
    #[serde(default)]
    pub vnet: VNetStatus,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureStatus {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default)]
    pub networks: NetworkStatus,
    #[serde(default)]
    pub resource_group: ResourceGroup,
    #[serde(default)]
    pub availability_sets: Vec<AvailabilitySet>,
    #[serde(default)]
    pub route_tables: Vec<RouteTable>,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityStatus>,
    #[serde(default)]
    pub zoned: bool,
}

impl From<VNet> for models::VNet {
    fn from(vnet: VNet) -> Self {
        models::VNet::from_parts(vnet.name, vnet.resource_group, vnet.cidr)
    }
}

impl From<&models::VNet> for VNet {
    fn from(vnet: &models::VNet) -> Self {
        let (name, resource_group, cidr) = vnet.to_parts();
        VNet {
            name,
            resource_group,
            cidr,
        }
    }
}

impl From<NatGatewayConfig> for models::NatGatewayConfig {
    fn from(nat: NatGatewayConfig) -> Self {
        models::NatGatewayConfig {
            enabled: nat.enabled,
            idle_connection_timeout_minutes: nat.idle_connection_timeout_minutes,
            zone: nat.zone,
            ip_addresses: nat
                .ip_addresses
                .into_iter()
                .map(|ip| models::PublicIpReference {
                    name: ip.name,
                    resource_group: ip.resource_group,
                    zone: ip.zone,
                })
                .collect(),
        }
    }
}

impl From<&models::NatGatewayConfig> for NatGatewayConfig {
    fn from(nat: &models::NatGatewayConfig) -> Self {
        NatGatewayConfig {
            enabled: nat.enabled,
            idle_connection_timeout_minutes: nat.idle_connection_timeout_minutes,
            zone: nat.zone,
            ip_addresses: nat
                .ip_addresses
                .iter()
                .map(|ip| PublicIpReference {
                    name: ip.name.clone(),
                    resource_group: ip.resource_group.clone(),
                    zone: ip.zone,
                })
                .collect(),
        }
    }
}

impl From<InfrastructureConfig> for models::InfrastructureConfig {
    fn from(config: InfrastructureConfig) -> Self {
        let networks = config.networks;
        let topology = if config.zoned {
            Topology::single_subnet_zonal(
                networks.workers,
                networks.service_endpoints,
                networks.nat_gateway.map(Into::into),
            )
        } else {
            if networks.nat_gateway.is_some() {
                log::warn!("v1alpha1: natGateway is ignored for a non-zoned configuration");
            }
            Topology::regional(networks.workers, networks.service_endpoints)
        };

        models::InfrastructureConfig {
            resource_group: config.resource_group,
            networks: models::NetworkConfig {
                vnet: networks.vnet.into(),
                topology,
            },
            identity: config.identity,
        }
    }
}

impl TryFrom<&models::InfrastructureConfig> for InfrastructureConfig {
    type Error = InfraError;

    fn try_from(config: &models::InfrastructureConfig) -> Result<Self> {
        let topology = &config.networks.topology;
        let (workers, service_endpoints, nat_gateway) = match topology {
            Topology::Regional(regional) => (regional.cidr, regional.service_endpoints.clone(), None),
            Topology::SingleSubnetZonal(single) => (
                single.cidr,
                single.service_endpoints.clone(),
                single.nat_gateway.as_ref().map(NatGatewayConfig::from),
            ),
            Topology::Zonal(zonal) => {
                return Err(InfraError::UnsupportedConversion(format!(
                    "cannot convert NetworkConfig using \"Zonal\" setup ({} zone(s)) to v1alpha1",
                    zonal.zones.len()
                )))
            }
        };

        Ok(InfrastructureConfig {
            type_meta: TypeMeta::new(ApiVersion::V1alpha1, KIND_INFRASTRUCTURE_CONFIG),
            resource_group: config.resource_group.clone(),
            networks: NetworkConfig {
                vnet: VNet::from(&config.networks.vnet),
                workers,
                service_endpoints,
                nat_gateway,
            },
            identity: config.identity.clone(),
            zoned: topology.kind().is_zoned(),
        })
    }
}

impl From<InfrastructureStatus> for models::InfrastructureStatus {
    fn from(status: InfrastructureStatus) -> Self {
        let topology = if status.zoned {
            TopologyKind::SingleSubnetZonal
        } else {
            TopologyKind::Regional
        };
        models::InfrastructureStatus {
            resource_group: status.resource_group,
            networks: models::NetworkStatus {
                vnet: status.networks.vnet,
                subnets: status
                    .networks
                    .subnets
                    .into_iter()
                    .map(|subnet| models::Subnet {
                        name: subnet.name,
                        purpose: subnet.purpose,
                        zone: None,
                    })
                    .collect(),
                topology,
            },
            availability_sets: status.availability_sets,
            route_tables: status.route_tables,
            security_groups: status.security_groups,
            identity: status.identity,
            zoned: status.zoned,
        }
    }
}

impl TryFrom<&models::InfrastructureStatus> for InfrastructureStatus {
    type Error = InfraError;

    fn try_from(status: &models::InfrastructureStatus) -> Result<Self> {
        if status.networks.topology == TopologyKind::Zonal {
            return Err(InfraError::UnsupportedConversion(format!(
                "cannot convert InfrastructureStatus of a \"Zonal\" setup ({} subnet(s)) to v1alpha1",
                status.networks.subnets.len()
            )));
        }

        Ok(InfrastructureStatus {
            type_meta: TypeMeta::new(ApiVersion::V1alpha1, KIND_INFRASTRUCTURE_STATUS),
            networks: NetworkStatus {
                vnet: status.networks.vnet.clone(),
                subnets: status
                    .networks
                    .subnets
                    .iter()
                    .map(|subnet| Subnet {
                        name: subnet.name.clone(),
                        purpose: subnet.purpose,
                    })
                    .collect(),
            },
            resource_group: status.resource_group.clone(),
            availability_sets: status.availability_sets.clone(),
            route_tables: status.route_tables.clone(),
            security_groups: status.security_groups.clone(),
            identity: status.identity.clone(),
            zoned: status.zoned,
        })
    }
}
