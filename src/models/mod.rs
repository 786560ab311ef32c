//! Domain models for infrastructure topology handling.
//!
//! This module contains the version independent data structures:
//! - [`Ipv4`] - IPv4 prefix used for every CIDR
//! - [`Topology`] - the three-way network topology union
//! - [`InfrastructureConfig`] - desired infrastructure
//! - [`InfrastructureStatus`] - provisioned infrastructure
//! - [`Cluster`] - cluster context (region, annotations, cloud profile)

mod cluster;
mod infrastructure;
mod ipv4;
mod status;
mod topology;

// Re-export public types
pub use cluster::{CloudProfileConfig, Cluster, DomainCount};
pub use infrastructure::{
    configured_identity, IdentityConfig, InfrastructureConfig, NetworkConfig, ResourceGroup, VNet,
};
pub use ipv4::{get_cidr_mask, Ipv4, MAX_LENGTH};
pub use status::{
    AvailabilitySet, IdentityStatus, InfrastructureStatus, NetworkStatus, Purpose, RouteTable,
    SecurityGroup, Subnet, VNetStatus,
};
pub use topology::{
    active_nat_gateway, NatGatewayConfig, PublicIpReference, RegionalTopology,
    SingleSubnetZonalTopology, Topology, TopologyKind, ZonalTopology, Zone,
};
