//! Internal infrastructure status, the record of what was provisioned.

use super::{ResourceGroup, TopologyKind};
use serde::{Deserialize, Serialize};

/// Purpose of a provisioned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Nodes,
    Internal,
}

/// A subnet that was created. `zone` is set only for zonal topologies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub name: String,
    pub purpose: Purpose,
    pub zone: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySet {
    pub purpose: Purpose,
    pub id: String,
    pub name: String,
    /// May be missing in statuses written by early versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_fault_domains: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_update_domains: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub purpose: Purpose,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub purpose: Purpose,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VNetStatus {
    pub name: String,
    /// Set when the VNet is owned by another resource group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStatus {
    pub id: String,
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(default)]
    pub acr_access: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkStatus {
    pub vnet: VNetStatus,
    /// One entry per worker subnet, in declared zone order.
    pub subnets: Vec<Subnet>,
    pub topology: TopologyKind,
}

/// Version independent infrastructure status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfrastructureStatus {
    pub resource_group: ResourceGroup,
    pub networks: NetworkStatus,
    pub availability_sets: Vec<AvailabilitySet>,
    pub route_tables: Vec<RouteTable>,
    pub security_groups: Vec<SecurityGroup>,
    pub identity: Option<IdentityStatus>,
    pub zoned: bool,
}

impl InfrastructureStatus {
    pub fn find_availability_set_by_purpose(&self, purpose: Purpose) -> Option<&AvailabilitySet> {
        self.availability_sets
            .iter()
            .find(|set| set.purpose == purpose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_availability_set_by_purpose() {
        let mut status = InfrastructureStatus {
            resource_group: ResourceGroup {
                name: "rg".to_string(),
            },
            networks: NetworkStatus {
                vnet: VNetStatus::default(),
                subnets: vec![],
                topology: TopologyKind::Regional,
            },
            availability_sets: vec![],
            route_tables: vec![],
            security_groups: vec![],
            identity: None,
            zoned: false,
        };
        assert!(status.find_availability_set_by_purpose(Purpose::Nodes).is_none());

        status.availability_sets.push(AvailabilitySet {
            purpose: Purpose::Internal,
            id: "internal-id".to_string(),
            name: "internal".to_string(),
            count_fault_domains: None,
            count_update_domains: None,
        });
        assert!(status.find_availability_set_by_purpose(Purpose::Nodes).is_none());

        status.availability_sets.push(AvailabilitySet {
            purpose: Purpose::Nodes,
            id: "nodes-id".to_string(),
            name: "nodes".to_string(),
            count_fault_domains: Some(2),
            count_update_domains: None,
        });
        let set = status
            .find_availability_set_by_purpose(Purpose::Nodes)
            .expect("nodes availability set");
        assert_eq!(set.id, "nodes-id");
    }

    #[test]
    fn test_identity_status_json_names() {
        let identity = IdentityStatus {
            id: "id".to_string(),
            client_id: "client".to_string(),
            acr_access: false,
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["clientID"], "client");
        assert_eq!(json["acrAccess"], false);
    }
}
