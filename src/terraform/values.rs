//! Template values for the Terraform infrastructure chart.
//!
//! [`compute_template_values`] turns the internal configuration into a typed
//! value tree. It serialises to the nested camelCase shape the chart expects:
//!
//! ```text
//! azure:          region, countFaultDomains?, countUpdateDomains?
//! create:         resourceGroup, vnet, availabilitySet
//! resourceGroup:  name, vnet { name, resourceGroup?, cidr? }
//! clusterName
//! networks:       subnets [ { cidr, serviceEndpoints, zone?, natGateway? } ]
//! identity?:      name, resourceGroup
//! outputKeys:     { <variable>: <output name> }
//! ```
//!
//! The output keys are derived by [`OutputKeys::for_config`], the same
//! function the state reconstruction uses to know which variables to read.

use super::InfraContext;
use crate::error::{InfraError, Result};
use crate::models::{
    active_nat_gateway, InfrastructureConfig, Ipv4, NatGatewayConfig, Topology, VNet,
};
use crate::processing::find_domain_counts;
use serde::Serialize;
use std::collections::BTreeMap;

pub const OUTPUT_KEY_RESOURCE_GROUP_NAME: &str = "resourceGroupName";
pub const OUTPUT_KEY_VNET_NAME: &str = "vnetName";
pub const OUTPUT_KEY_VNET_RESOURCE_GROUP: &str = "vnetResourceGroup";
pub const OUTPUT_KEY_SUBNET_NAME: &str = "subnetName";
pub const OUTPUT_KEY_AVAILABILITY_SET_ID: &str = "availabilitySetID";
pub const OUTPUT_KEY_AVAILABILITY_SET_NAME: &str = "availabilitySetName";
pub const OUTPUT_KEY_COUNT_FAULT_DOMAINS: &str = "countFaultDomains";
pub const OUTPUT_KEY_COUNT_UPDATE_DOMAINS: &str = "countUpdateDomains";
pub const OUTPUT_KEY_ROUTE_TABLE_NAME: &str = "routeTableName";
pub const OUTPUT_KEY_SECURITY_GROUP_NAME: &str = "securityGroupName";
pub const OUTPUT_KEY_IDENTITY_ID: &str = "identityID";
pub const OUTPUT_KEY_IDENTITY_CLIENT_ID: &str = "identityClientID";

/// Output variable holding the name of the subnet at `index`.
///
/// The first subnet uses `subnetName`, every further zone `subnetName-z<n>`
/// with `n` counting from 0 at the second zone.
pub fn subnet_output_key(index: usize) -> String {
    match index {
        0 => OUTPUT_KEY_SUBNET_NAME.to_string(),
        n => format!("{OUTPUT_KEY_SUBNET_NAME}-z{}", n - 1),
    }
}

/// Output variables the tool must populate, keyed by template variable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct OutputKeys(BTreeMap<String, String>);

impl OutputKeys {
    /// Derive the expected output variables from the configuration and the
    /// availability-set decision.
    pub fn for_config(config: &InfrastructureConfig, availability_set_required: bool) -> OutputKeys {
        let mut keys = OutputKeys::default();
        keys.insert(OUTPUT_KEY_RESOURCE_GROUP_NAME);
        keys.insert(OUTPUT_KEY_VNET_NAME);
        keys.insert(OUTPUT_KEY_ROUTE_TABLE_NAME);
        keys.insert(OUTPUT_KEY_SECURITY_GROUP_NAME);

        for index in 0..config.networks.topology.subnet_count() {
            keys.insert(&subnet_output_key(index));
        }

        if config.networks.vnet.is_existing() {
            keys.insert(OUTPUT_KEY_VNET_RESOURCE_GROUP);
        }

        if availability_set_required {
            keys.insert(OUTPUT_KEY_AVAILABILITY_SET_ID);
            keys.insert(OUTPUT_KEY_AVAILABILITY_SET_NAME);
            keys.insert(OUTPUT_KEY_COUNT_FAULT_DOMAINS);
            keys.insert(OUTPUT_KEY_COUNT_UPDATE_DOMAINS);
        }

        if config.configured_identity().is_some() {
            keys.insert(OUTPUT_KEY_IDENTITY_ID);
            keys.insert(OUTPUT_KEY_IDENTITY_CLIENT_ID);
        }

        keys
    }

    fn insert(&mut self, key: &str) {
        self.0.insert(key.to_string(), key.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Output variable names, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.0.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureValues {
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_fault_domains: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_update_domains: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateValues {
    pub resource_group: bool,
    pub vnet: bool,
    pub availability_set: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VNetValues {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<Ipv4>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceGroupValues {
    pub name: String,
    pub vnet: VNetValues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpValues {
    pub name: String,
    pub resource_group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NatGatewayValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_connection_timeout_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<PublicIpValues>,
}

impl NatGatewayValues {
    /// Values for an enabled NAT gateway; `None` when absent or disabled.
    fn from_config(nat: Option<&NatGatewayConfig>) -> Option<NatGatewayValues> {
        active_nat_gateway(nat).map(|nat| NatGatewayValues {
            idle_connection_timeout_minutes: nat.idle_connection_timeout_minutes,
            zone: nat.zone,
            ip_addresses: nat
                .ip_addresses
                .iter()
                .map(|ip| PublicIpValues {
                    name: ip.name.clone(),
                    resource_group: ip.resource_group.clone(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetValues {
    pub cidr: Ipv4,
    pub service_endpoints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_gateway: Option<NatGatewayValues>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkValues {
    pub subnets: Vec<SubnetValues>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityValues {
    pub name: String,
    pub resource_group: String,
}

/// Input values of the Terraform infrastructure chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateValues {
    pub azure: AzureValues,
    pub create: CreateValues,
    pub resource_group: ResourceGroupValues,
    pub cluster_name: String,
    pub networks: NetworkValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityValues>,
    pub output_keys: OutputKeys,
}

/// Address range of a VNet to create. An explicit CIDR wins, otherwise the
/// single worker subnet range is used.
fn vnet_cidr(explicit: Option<Ipv4>, topology: &Topology) -> Result<Ipv4> {
    explicit
        .or_else(|| topology.subnet_cidr())
        .ok_or(InfraError::CannotDeriveVNetCidr)
}

fn subnet_values(topology: &Topology) -> Vec<SubnetValues> {
    match topology {
        Topology::Regional(regional) => vec![SubnetValues {
            cidr: regional.cidr,
            service_endpoints: regional.service_endpoints.clone(),
            zone: None,
            nat_gateway: None,
        }],
        Topology::SingleSubnetZonal(single) => vec![SubnetValues {
            cidr: single.cidr,
            service_endpoints: single.service_endpoints.clone(),
            zone: None,
            nat_gateway: NatGatewayValues::from_config(single.nat_gateway.as_ref()),
        }],
        Topology::Zonal(zonal) => zonal
            .zones
            .iter()
            .map(|zone| SubnetValues {
                cidr: zone.cidr,
                service_endpoints: zone.service_endpoints.clone(),
                zone: Some(zone.name),
                // the NAT gateway of a zone always lives in that zone
                nat_gateway: NatGatewayValues::from_config(zone.nat_gateway.as_ref()).map(
                    |nat| NatGatewayValues {
                        zone: Some(zone.name),
                        ..nat
                    },
                ),
            })
            .collect(),
    }
}

/// Compute the values for the Terraform infrastructure chart.
///
/// # Arguments
/// * `ctx` - Configuration, cluster, prior status and settings of this pass
///
/// # Returns
/// * `Ok(TemplateValues)` - The value tree, including the expected output keys
/// * `Err` - If the topology is invalid, no VNet CIDR can be derived, the
///   availability-set policy is violated or a domain count is missing
pub fn compute_template_values(ctx: &InfraContext<'_>) -> Result<TemplateValues> {
    let config = ctx.config;
    let cluster = ctx.cluster;
    let topology = &config.networks.topology;
    topology.validate()?;

    let availability_set_required = ctx.availability_set_required()?;

    let (create_resource_group, resource_group_name) = match &config.resource_group {
        Some(resource_group) => (false, resource_group.name.clone()),
        None => (true, cluster.name.clone()),
    };

    let (create_vnet, vnet) = match &config.networks.vnet {
        VNet::Existing {
            name,
            resource_group,
        } => (
            false,
            VNetValues {
                name: name.clone(),
                resource_group: Some(resource_group.clone()),
                cidr: None,
            },
        ),
        VNet::New { cidr } => (
            true,
            VNetValues {
                name: cluster.name.clone(),
                resource_group: None,
                cidr: Some(vnet_cidr(*cidr, topology)?),
            },
        ),
    };

    let mut azure = AzureValues {
        region: cluster.region.clone(),
        count_fault_domains: None,
        count_update_domains: None,
    };
    if availability_set_required {
        let counts = find_domain_counts(cluster, ctx.prior_status)?;
        azure.count_fault_domains = Some(counts.fault_domains);
        azure.count_update_domains = Some(counts.update_domains);
    }

    let identity = config.configured_identity().map(|identity| IdentityValues {
        name: identity.name.clone(),
        resource_group: identity.resource_group.clone(),
    });

    let output_keys = OutputKeys::for_config(config, availability_set_required);

    log::info!(
        "template values for {}: topology={} subnets={} availabilitySet={} identity={} outputKeys={}",
        cluster.name,
        topology.kind(),
        topology.subnet_count(),
        availability_set_required,
        identity.is_some(),
        output_keys.len()
    );

    Ok(TemplateValues {
        azure,
        create: CreateValues {
            resource_group: create_resource_group,
            vnet: create_vnet,
            availability_set: availability_set_required,
        },
        resource_group: ResourceGroupValues {
            name: resource_group_name,
            vnet,
        },
        cluster_name: cluster.name.clone(),
        networks: NetworkValues {
            subnets: subnet_values(topology),
        },
        identity,
        output_keys,
    })
}

/// Render the value tree as JSON for the template engine.
pub fn render_values_json(values: &TemplateValues) -> Result<String> {
    Ok(serde_json::to_string_pretty(values)?)
}
