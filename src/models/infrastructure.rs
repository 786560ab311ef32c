//! Internal infrastructure configuration.

use super::{Ipv4, Topology};
use serde::{Deserialize, Serialize};

/// Azure resource group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub name: String,
}

/// Virtual network reference: an existing, externally owned VNet or one to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VNet {
    Existing { name: String, resource_group: String },
    New { cidr: Option<Ipv4> },
}

impl Default for VNet {
    fn default() -> Self {
        VNet::New { cidr: None }
    }
}

impl VNet {
    /// Build from the optional fields of a versioned document. Only a complete
    /// name/resource group pair refers to an existing VNet.
    pub fn from_parts(
        name: Option<String>,
        resource_group: Option<String>,
        cidr: Option<Ipv4>,
    ) -> VNet {
        match (name, resource_group) {
            (Some(name), Some(resource_group)) => {
                if let Some(cidr) = cidr {
                    log::warn!("ignoring cidr {cidr} of existing vnet {resource_group}/{name}");
                }
                VNet::Existing {
                    name,
                    resource_group,
                }
            }
            (name, resource_group) => {
                if name.is_some() || resource_group.is_some() {
                    log::warn!(
                        "incomplete existing vnet reference name={name:?} resourceGroup={resource_group:?}, a new vnet will be created"
                    );
                }
                VNet::New { cidr }
            }
        }
    }

    /// Split into `(name, resource_group, cidr)`.
    pub fn to_parts(&self) -> (Option<String>, Option<String>, Option<Ipv4>) {
        match self {
            VNet::Existing {
                name,
                resource_group,
            } => (Some(name.clone()), Some(resource_group.clone()), None),
            VNet::New { cidr } => (None, None, *cidr),
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, VNet::Existing { .. })
    }
}

/// Managed identity to attach to the worker nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityConfig {
    pub name: String,
    pub resource_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acr_access: Option<bool>,
}

impl IdentityConfig {
    /// An identity counts only with both name and resource group set.
    pub fn is_configured(&self) -> bool {
        !self.name.is_empty() && !self.resource_group.is_empty()
    }

    pub fn acr_access_requested(&self) -> bool {
        self.acr_access == Some(true)
    }
}

/// Returns the identity only if it is fully configured.
pub fn configured_identity(identity: Option<&IdentityConfig>) -> Option<&IdentityConfig> {
    identity.filter(|identity| identity.is_configured())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub vnet: VNet,
    pub topology: Topology,
}

/// Version independent infrastructure configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfrastructureConfig {
    /// Existing resource group to deploy into, if any.
    pub resource_group: Option<ResourceGroup>,
    pub networks: NetworkConfig,
    pub identity: Option<IdentityConfig>,
}

impl InfrastructureConfig {
    pub fn configured_identity(&self) -> Option<&IdentityConfig> {
        configured_identity(self.identity.as_ref())
    }
}
