//! Availability-set policy.
//!
//! Decides on every reconciliation whether the cluster-wide "nodes"
//! availability set must exist, and which fault/update domain counts it uses.
//! The decision is a pure function of the topology kind, the prior status and
//! the cluster's opt-out annotation. Once a cluster has an availability set it
//! can not move to the opt-out mode.

use crate::config::{LegacyStatusPolicy, PolicySettings};
use crate::error::{InfraError, Result};
use crate::models::{Cluster, InfrastructureStatus, Purpose, TopologyKind};

/// Determine if the cluster's primary availability set is required.
///
/// # Arguments
/// * `kind` - Topology kind of the configuration
/// * `prior_status` - Status of the previous reconciliation, `None` for a new cluster
/// * `has_vmo_annotation` - Whether the cluster opted out of availability sets
/// * `settings` - Policy settings, see [`LegacyStatusPolicy`]
///
/// # Returns
/// * `Ok(bool)` - Whether the availability set is required
/// * `Err(InfraError::IncompatibleOrchestrationModeSwitch)` - If the cluster
///   already has a "nodes" availability set and now asks to opt out
pub fn is_primary_availability_set_required(
    kind: TopologyKind,
    prior_status: Option<&InfrastructureStatus>,
    has_vmo_annotation: bool,
    settings: &PolicySettings,
) -> Result<bool> {
    if kind != TopologyKind::Regional {
        return Ok(false);
    }

    let status = match prior_status {
        None => return Ok(!has_vmo_annotation),
        Some(status) => status,
    };

    if status
        .find_availability_set_by_purpose(Purpose::Nodes)
        .is_some()
    {
        if has_vmo_annotation {
            return Err(InfraError::IncompatibleOrchestrationModeSwitch);
        }
        return Ok(true);
    }

    if has_vmo_annotation {
        return Ok(false);
    }

    match settings.legacy_status {
        LegacyStatusPolicy::Derive => {
            log::info!(
                "prior status has no nodes availability set, deriving as for a new regional cluster"
            );
            Ok(true)
        }
        LegacyStatusPolicy::NotRequired => {
            log::warn!(
                "prior status has no nodes availability set, keeping the cluster without one"
            );
            Ok(false)
        }
    }
}

/// Fault and update domain counts of the primary availability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainCounts {
    pub fault_domains: i32,
    pub update_domains: i32,
}

/// Find the domain counts for the primary availability set.
///
/// Counts recorded on the prior "nodes" availability set win. Each missing
/// count falls back to the cloud profile default of the cluster region.
pub fn find_domain_counts(
    cluster: &Cluster,
    prior_status: Option<&InfrastructureStatus>,
) -> Result<DomainCounts> {
    let nodes_set =
        prior_status.and_then(|status| status.find_availability_set_by_purpose(Purpose::Nodes));
    let recorded_fault = nodes_set.and_then(|set| set.count_fault_domains);
    let recorded_update = nodes_set.and_then(|set| set.count_update_domains);

    let fault_domains = match recorded_fault {
        Some(count) => count,
        None => cluster.cloud_profile.fault_domains_for(&cluster.region)?,
    };
    let update_domains = match recorded_update {
        Some(count) => count,
        None => cluster.cloud_profile.update_domains_for(&cluster.region)?,
    };

    log::debug!(
        "domain counts for {}: fault={fault_domains} (recorded={}) update={update_domains} (recorded={})",
        cluster.region,
        recorded_fault.is_some(),
        recorded_update.is_some()
    );
    Ok(DomainCounts {
        fault_domains,
        update_domains,
    })
}
