//! Status reconstruction from the tool's output variables.
//!
//! The keys to read come from [`OutputKeys::for_config`] applied to the same
//! configuration and availability-set decision used for projection, so the
//! reconstructor never expects a variable the tool was not asked to emit.

use super::values::{
    subnet_output_key, OutputKeys, OUTPUT_KEY_AVAILABILITY_SET_ID,
    OUTPUT_KEY_AVAILABILITY_SET_NAME, OUTPUT_KEY_COUNT_FAULT_DOMAINS,
    OUTPUT_KEY_COUNT_UPDATE_DOMAINS, OUTPUT_KEY_IDENTITY_CLIENT_ID, OUTPUT_KEY_IDENTITY_ID,
    OUTPUT_KEY_RESOURCE_GROUP_NAME, OUTPUT_KEY_ROUTE_TABLE_NAME, OUTPUT_KEY_SECURITY_GROUP_NAME,
    OUTPUT_KEY_VNET_NAME, OUTPUT_KEY_VNET_RESOURCE_GROUP,
};
use super::InfraContext;
use crate::error::{InfraError, Result, ToolError};
use crate::models::{
    AvailabilitySet, IdentityStatus, InfrastructureConfig, InfrastructureStatus, NetworkStatus,
    Purpose, ResourceGroup, RouteTable, SecurityGroup, Subnet, Topology, VNetStatus,
};
use std::collections::HashMap;

/// Source of the provisioning tool's output variables.
pub trait Terraformer: Send + Sync {
    /// Return the values of the requested output variables. Values are
    /// strings; variables the tool does not know may be left out.
    fn state_output_variables(
        &self,
        keys: &[String],
    ) -> std::result::Result<HashMap<String, String>, ToolError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySetState {
    pub id: String,
    pub name: String,
    pub count_fault_domains: i32,
    pub count_update_domains: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityState {
    pub id: String,
    pub client_id: String,
}

/// Typed view of the tool outputs of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformState {
    pub resource_group_name: String,
    pub vnet_name: String,
    pub vnet_resource_group_name: Option<String>,
    /// In declared zone order.
    pub subnet_names: Vec<String>,
    pub route_table_name: String,
    pub security_group_name: String,
    pub availability_set: Option<AvailabilitySetState>,
    pub identity: Option<IdentityState>,
}

struct Outputs<'a>(&'a HashMap<String, String>);

impl Outputs<'_> {
    fn get(&self, key: &str) -> Result<String> {
        self.0
            .get(key)
            .cloned()
            .ok_or_else(|| InfraError::MalformedToolOutput(format!("missing output variable {key}")))
    }

    fn get_count(&self, key: &str) -> Result<i32> {
        let value = self.get(key)?;
        value.trim().parse::<i32>().map_err(|e| {
            InfraError::MalformedToolOutput(format!("{key}={value:?} is not an integer: {e}"))
        })
    }
}

/// Read the tool outputs into a [`TerraformState`].
///
/// # Arguments
/// * `vars` - Output variables returned by the tool
/// * `config` - Configuration the outputs were produced for
/// * `availability_set_required` - Availability-set decision of this pass
///
/// # Returns
/// * `Ok(TerraformState)` - The typed outputs
/// * `Err(InfraError::InvalidTopology)` - If the topology is invalid
/// * `Err(InfraError::MalformedToolOutput)` - If an expected variable is
///   missing or a domain count is not an integer
pub fn extract_terraform_state(
    vars: &HashMap<String, String>,
    config: &InfrastructureConfig,
    availability_set_required: bool,
) -> Result<TerraformState> {
    config.networks.topology.validate()?;
    let outputs = Outputs(vars);

    let vnet_resource_group_name = if config.networks.vnet.is_existing() {
        Some(outputs.get(OUTPUT_KEY_VNET_RESOURCE_GROUP)?).filter(|rg| !rg.is_empty())
    } else {
        None
    };

    let subnet_names = (0..config.networks.topology.subnet_count())
        .map(|index| outputs.get(&subnet_output_key(index)))
        .collect::<Result<Vec<_>>>()?;

    let availability_set = if availability_set_required {
        let id = outputs.get(OUTPUT_KEY_AVAILABILITY_SET_ID)?;
        let name = outputs.get(OUTPUT_KEY_AVAILABILITY_SET_NAME)?;
        let count_fault_domains = outputs.get_count(OUTPUT_KEY_COUNT_FAULT_DOMAINS)?;
        let count_update_domains = outputs.get_count(OUTPUT_KEY_COUNT_UPDATE_DOMAINS)?;
        if id.is_empty() || name.is_empty() {
            log::warn!("availability set required but the tool reported no id or name");
            None
        } else {
            Some(AvailabilitySetState {
                id,
                name,
                count_fault_domains,
                count_update_domains,
            })
        }
    } else {
        None
    };

    let identity = if config.configured_identity().is_some() {
        let id = outputs.get(OUTPUT_KEY_IDENTITY_ID)?;
        let client_id = outputs.get(OUTPUT_KEY_IDENTITY_CLIENT_ID)?;
        (!id.is_empty() && !client_id.is_empty()).then_some(IdentityState { id, client_id })
    } else {
        None
    };

    Ok(TerraformState {
        resource_group_name: outputs.get(OUTPUT_KEY_RESOURCE_GROUP_NAME)?,
        vnet_name: outputs.get(OUTPUT_KEY_VNET_NAME)?,
        vnet_resource_group_name,
        subnet_names,
        route_table_name: outputs.get(OUTPUT_KEY_ROUTE_TABLE_NAME)?,
        security_group_name: outputs.get(OUTPUT_KEY_SECURITY_GROUP_NAME)?,
        availability_set,
        identity,
    })
}

/// Build the status from the typed tool outputs.
///
/// Subnets follow the declared zone order and carry a zone only for the
/// zonal topology. The topology kind comes from the configuration.
pub fn status_from_terraform_state(
    state: &TerraformState,
    config: &InfrastructureConfig,
) -> InfrastructureStatus {
    let topology = &config.networks.topology;

    let subnets = match topology {
        Topology::Zonal(zonal) => state
            .subnet_names
            .iter()
            .zip(&zonal.zones)
            .map(|(name, zone)| Subnet {
                name: name.clone(),
                purpose: Purpose::Nodes,
                zone: Some(zone.name),
            })
            .collect(),
        Topology::Regional(_) | Topology::SingleSubnetZonal(_) => state
            .subnet_names
            .iter()
            .map(|name| Subnet {
                name: name.clone(),
                purpose: Purpose::Nodes,
                zone: None,
            })
            .collect(),
    };

    let availability_sets = state
        .availability_set
        .iter()
        .map(|set| AvailabilitySet {
            purpose: Purpose::Nodes,
            id: set.id.clone(),
            name: set.name.clone(),
            count_fault_domains: Some(set.count_fault_domains),
            count_update_domains: Some(set.count_update_domains),
        })
        .collect();

    InfrastructureStatus {
        resource_group: ResourceGroup {
            name: state.resource_group_name.clone(),
        },
        networks: NetworkStatus {
            vnet: VNetStatus {
                name: state.vnet_name.clone(),
                resource_group: state.vnet_resource_group_name.clone(),
            },
            subnets,
            topology: topology.kind(),
        },
        availability_sets,
        route_tables: vec![RouteTable {
            purpose: Purpose::Nodes,
            name: state.route_table_name.clone(),
        }],
        security_groups: vec![SecurityGroup {
            purpose: Purpose::Nodes,
            name: state.security_group_name.clone(),
        }],
        identity: state.identity.as_ref().map(|identity| IdentityStatus {
            id: identity.id.clone(),
            client_id: identity.client_id.clone(),
            acr_access: false,
        }),
        zoned: topology.kind().is_zoned(),
    }
}

/// Read the tool outputs and compute the infrastructure status.
///
/// ACR access is set on the identity only when the configuration asked for it
/// and the tool reported an identity. Errors from the tool are returned as
/// [`InfraError::Tool`] unchanged. Nothing is returned on partial failure.
pub fn compute_status(tf: &dyn Terraformer, ctx: &InfraContext<'_>) -> Result<InfrastructureStatus> {
    let config = ctx.config;
    let availability_set_required = ctx.availability_set_required()?;
    let keys = OutputKeys::for_config(config, availability_set_required).keys();

    log::debug!("requesting {} output variables: {:?}", keys.len(), keys);
    let vars = tf.state_output_variables(&keys).map_err(InfraError::Tool)?;

    let state = extract_terraform_state(&vars, config, availability_set_required)?;
    let mut status = status_from_terraform_state(&state, config);

    let acr_requested = config
        .configured_identity()
        .is_some_and(|identity| identity.acr_access_requested());
    if let Some(identity) = status.identity.as_mut() {
        identity.acr_access = acr_requested;
    }

    log::info!(
        "status for {}: topology={} subnets={} availabilitySets={} identity={}",
        ctx.cluster.name,
        status.networks.topology,
        status.networks.subnets.len(),
        status.availability_sets.len(),
        status.identity.is_some()
    );
    Ok(status)
}
