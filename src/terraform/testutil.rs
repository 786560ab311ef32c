//! Fixtures shared by the projection and reconstruction tests.

use crate::models::{
    AvailabilitySet, CloudProfileConfig, Cluster, DomainCount, IdentityConfig,
    InfrastructureConfig, InfrastructureStatus, Ipv4, NatGatewayConfig, NetworkConfig,
    NetworkStatus, Purpose, ResourceGroup, Topology, TopologyKind, VNet, VNetStatus, Zone,
};

pub fn cidr(s: &str) -> Ipv4 {
    Ipv4::new(s).unwrap()
}

pub fn cluster() -> Cluster {
    Cluster {
        name: "shoot--dev--foo".to_string(),
        region: "westeurope".to_string(),
        annotations: Default::default(),
        cloud_profile: CloudProfileConfig {
            count_fault_domains: vec![DomainCount {
                region: "westeurope".to_string(),
                count: 2,
            }],
            count_update_domains: vec![DomainCount {
                region: "westeurope".to_string(),
                count: 5,
            }],
        },
    }
}

pub fn config(topology: Topology) -> InfrastructureConfig {
    InfrastructureConfig {
        resource_group: None,
        networks: NetworkConfig {
            vnet: VNet::default(),
            topology,
        },
        identity: None,
    }
}

pub fn regional() -> Topology {
    Topology::regional(cidr("10.250.0.0/19"), vec!["Microsoft.Storage".to_string()])
}

pub fn single_subnet_zonal(nat_gateway: Option<NatGatewayConfig>) -> Topology {
    Topology::single_subnet_zonal(cidr("10.250.0.0/19"), vec![], nat_gateway)
}

pub fn zone(name: i32, nat_gateway: Option<NatGatewayConfig>) -> Zone {
    Zone {
        name,
        cidr: cidr(&format!("10.250.{name}.0/24")),
        service_endpoints: vec![],
        nat_gateway,
    }
}

pub fn zonal(zones: Vec<Zone>) -> Topology {
    Topology::zonal(zones, None).unwrap()
}

pub fn identity(name: &str, resource_group: &str, acr_access: Option<bool>) -> IdentityConfig {
    IdentityConfig {
        name: name.to_string(),
        resource_group: resource_group.to_string(),
        acr_access,
    }
}

pub fn prior_status(availability_sets: Vec<AvailabilitySet>) -> InfrastructureStatus {
    InfrastructureStatus {
        resource_group: ResourceGroup {
            name: "shoot--dev--foo".to_string(),
        },
        networks: NetworkStatus {
            vnet: VNetStatus {
                name: "shoot--dev--foo".to_string(),
                resource_group: None,
            },
            subnets: vec![],
            topology: TopologyKind::Regional,
        },
        availability_sets,
        route_tables: vec![],
        security_groups: vec![],
        identity: None,
        zoned: false,
    }
}

pub fn nodes_availability_set(fault: Option<i32>, update: Option<i32>) -> AvailabilitySet {
    AvailabilitySet {
        purpose: Purpose::Nodes,
        id: "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Compute/availabilitySets/av"
            .to_string(),
        name: "shoot--dev--foo-avset-workers".to_string(),
        count_fault_domains: fault,
        count_update_domains: update,
    }
}
