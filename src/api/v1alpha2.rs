//! `v1alpha2` documents.
//!
//! The network carries the topology union directly as three optional members,
//! exactly one of which may be set. The status records the topology kind and
//! the zone of every subnet.

use super::{ApiVersion, TypeMeta, KIND_INFRASTRUCTURE_CONFIG, KIND_INFRASTRUCTURE_STATUS};
use crate::error::{InfraError, Result};
use crate::models::{self, Ipv4, Topology, TopologyKind};
use serde::{Deserialize, Serialize};

pub use super::v1alpha1::{NatGatewayConfig, PublicIpReference, VNet};
pub use crate::models::{
    AvailabilitySet, IdentityConfig, IdentityStatus, Purpose, ResourceGroup, RouteTable,
    SecurityGroup, VNetStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalTopology {
    pub cidr: Ipv4,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_endpoints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSubnetZonalTopology {
    pub cidr: Ipv4,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_endpoints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_gateway: Option<NatGatewayConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub name: i32,
    pub cidr: Ipv4,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_endpoints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_gateway: Option<NatGatewayConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonalTopology {
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_cidr: Option<Ipv4>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(default)]
    pub vnet: VNet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional: Option<RegionalTopology>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_subnet_zonal: Option<SingleSubnetZonalTopology>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zonal: Option<ZonalTopology>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceGroup>,
    #[serde(default)]
    pub networks: NetworkConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub name: String,
    pub purpose: Purpose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkStatus {
    #[serde(default)]
    pub vnet: VNetStatus,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    /// Absent in statuses written before the topology kind was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<TopologyKind>,
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

impl From<Zone> for models::Zone {
    fn from(zone: Zone) -> Self {
        models::Zone {
            name: zone.name,
            cidr: zone.cidr,
            service_endpoints: zone.service_endpoints,
            nat_gateway: zone.nat_gateway.map(Into::into),
        }
    }
}

impl From<&models::Zone> for Zone {
    fn from(zone: &models::Zone) -> Self {
        Zone {
            name: zone.name,
            cidr: zone.cidr,
            service_endpoints: zone.service_endpoints.clone(),
            nat_gateway: zone.nat_gateway.as_ref().map(NatGatewayConfig::from),
        }
    }
}

impl TryFrom<InfrastructureConfig> for models::InfrastructureConfig {
    type Error = InfraError;

    fn try_from(config: InfrastructureConfig) -> Result<Self> {
        let networks = config.networks;
        let topology = Topology::from_parts(
            networks.regional.map(|regional| models::RegionalTopology {
                cidr: regional.cidr,
                service_endpoints: regional.service_endpoints,
            }),
            networks
                .single_subnet_zonal
                .map(|single| models::SingleSubnetZonalTopology {
                    cidr: single.cidr,
                    service_endpoints: single.service_endpoints,
                    nat_gateway: single.nat_gateway.map(Into::into),
                }),
            networks.zonal.map(|zonal| models::ZonalTopology {
                zones: zonal.zones.into_iter().map(Into::into).collect(),
                internal_cidr: zonal.internal_cidr,
            }),
        )?;

        Ok(models::InfrastructureConfig {
            resource_group: config.resource_group,
            networks: models::NetworkConfig {
                vnet: networks.vnet.into(),
                topology,
            },
            identity: config.identity,
        })
    }
}

impl From<&models::InfrastructureConfig> for InfrastructureConfig {
    fn from(config: &models::InfrastructureConfig) -> Self {
        let mut networks = NetworkConfig {
            vnet: VNet::from(&config.networks.vnet),
            ..Default::default()
        };
        match &config.networks.topology {
            Topology::Regional(regional) => {
                networks.regional = Some(RegionalTopology {
                    cidr: regional.cidr,
                    service_endpoints: regional.service_endpoints.clone(),
                })
            }
            Topology::SingleSubnetZonal(single) => {
                networks.single_subnet_zonal = Some(SingleSubnetZonalTopology {
                    cidr: single.cidr,
                    service_endpoints: single.service_endpoints.clone(),
                    nat_gateway: single.nat_gateway.as_ref().map(NatGatewayConfig::from),
                })
            }
            Topology::Zonal(zonal) => {
                networks.zonal = Some(ZonalTopology {
                    zones: zonal.zones.iter().map(Zone::from).collect(),
                    internal_cidr: zonal.internal_cidr,
                })
            }
        }

        InfrastructureConfig {
            type_meta: TypeMeta::new(ApiVersion::V1alpha2, KIND_INFRASTRUCTURE_CONFIG),
            resource_group: config.resource_group.clone(),
            networks,
            identity: config.identity.clone(),
        }
    }
}

impl From<InfrastructureStatus> for models::InfrastructureStatus {
    fn from(status: InfrastructureStatus) -> Self {
        let has_zones = status.networks.subnets.iter().any(|s| s.zone.is_some());
        let topology = status.networks.topology.unwrap_or(if has_zones {
            TopologyKind::Zonal
        } else if status.zoned {
            TopologyKind::SingleSubnetZonal
        } else {
            TopologyKind::Regional
        });

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
                        zone: subnet.zone,
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

impl From<&models::InfrastructureStatus> for InfrastructureStatus {
    fn from(status: &models::InfrastructureStatus) -> Self {
        InfrastructureStatus {
            type_meta: TypeMeta::new(ApiVersion::V1alpha2, KIND_INFRASTRUCTURE_STATUS),
            networks: NetworkStatus {
                vnet: status.networks.vnet.clone(),
                subnets: status
                    .networks
                    .subnets
                    .iter()
                    .map(|subnet| Subnet {
                        name: subnet.name.clone(),
                        purpose: subnet.purpose,
                        zone: subnet.zone,
                    })
                    .collect(),
                topology: Some(status.networks.topology),
            },
            resource_group: status.resource_group.clone(),
            availability_sets: status.availability_sets.clone(),
            route_tables: status.route_tables.clone(),
            security_groups: status.security_groups.clone(),
            identity: status.identity.clone(),
            zoned: status.zoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zonal_json(zones: &str) -> String {
        format!(
            r#"{{
                "apiVersion": "azure.provider.extensions.gardener.cloud/v1alpha2",
                "kind": "InfrastructureConfig",
                "networks": {{
                    "vnet": {{ "cidr": "10.0.0.0/8" }},
                    "zonal": {{ "zones": {zones} }}
                }}
            }}"#
        )
    }

    #[test]
    fn test_zonal_maps_one_to_one() {
        let json = zonal_json(
            r#"[
                { "name": 2, "cidr": "10.0.2.0/24", "natGateway": { "enabled": true, "idleConnectionTimeoutMinutes": 4 } },
                { "name": 1, "cidr": "10.0.1.0/24", "serviceEndpoints": ["Microsoft.Storage"] }
            ]"#,
        );
        let external: InfrastructureConfig = serde_json::from_str(&json).unwrap();
        let config = models::InfrastructureConfig::try_from(external.clone()).unwrap();

        let zones = config.networks.topology.zones();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name, 2);
        assert_eq!(
            zones[0].nat_gateway.as_ref().unwrap().idle_connection_timeout_minutes,
            Some(4)
        );
        assert_eq!(zones[1].service_endpoints, vec!["Microsoft.Storage"]);

        let back = InfrastructureConfig::from(&config);
        assert_eq!(back, external);
    }

    #[test]
    fn test_zonal_without_zones_is_invalid() {
        let external: InfrastructureConfig = serde_json::from_str(&zonal_json("[]")).unwrap();
        assert!(matches!(
            models::InfrastructureConfig::try_from(external),
            Err(InfraError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_missing_topology_is_invalid() {
        let json = r#"{
            "apiVersion": "azure.provider.extensions.gardener.cloud/v1alpha2",
            "kind": "InfrastructureConfig",
            "networks": { "vnet": { "name": "vnet", "resourceGroup": "rg" } }
        }"#;
        let external: InfrastructureConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(
            models::InfrastructureConfig::try_from(external),
            Err(InfraError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_status_topology_fallback() {
        let json = r#"{
            "apiVersion": "azure.provider.extensions.gardener.cloud/v1alpha2",
            "kind": "InfrastructureStatus",
            "networks": {
                "vnet": { "name": "vnet" },
                "subnets": [
                    { "name": "a", "purpose": "nodes", "zone": 1 },
                    { "name": "b", "purpose": "nodes", "zone": 2 }
                ]
            },
            "zoned": true
        }"#;
        let status: InfrastructureStatus = serde_json::from_str(json).unwrap();
        let status = models::InfrastructureStatus::from(status);
        assert_eq!(status.networks.topology, TopologyKind::Zonal);
        assert_eq!(status.networks.subnets[1].zone, Some(2));

        let back = InfrastructureStatus::from(&status);
        assert_eq!(back.networks.topology, Some(TopologyKind::Zonal));
        let json = serde_json::to_value(&back).unwrap();
        assert_eq!(json["networks"]["topology"], "zonal");
        assert_eq!(json["kind"], "InfrastructureStatus");
    }
}
