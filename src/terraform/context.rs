//! Inputs of one reconciliation pass.

use crate::config::PolicySettings;
use crate::error::Result;
use crate::models::{Cluster, InfrastructureConfig, InfrastructureStatus};
use crate::processing::is_primary_availability_set_required;

/// Everything projection and reconstruction read. Both sides derive their
/// decisions from the same context, so they agree on the output keys.
#[derive(Debug, Clone, Copy)]
pub struct InfraContext<'a> {
    pub config: &'a InfrastructureConfig,
    pub cluster: &'a Cluster,
    /// Status written by the previous pass, `None` for a new cluster.
    pub prior_status: Option<&'a InfrastructureStatus>,
    pub settings: &'a PolicySettings,
}

impl<'a> InfraContext<'a> {
    pub fn new(
        config: &'a InfrastructureConfig,
        cluster: &'a Cluster,
        prior_status: Option<&'a InfrastructureStatus>,
        settings: &'a PolicySettings,
    ) -> InfraContext<'a> {
        InfraContext {
            config,
            cluster,
            prior_status,
            settings,
        }
    }

    pub fn availability_set_required(&self) -> Result<bool> {
        is_primary_availability_set_required(
            self.config.networks.topology.kind(),
            self.prior_status,
            self.cluster.has_vmo_annotation(),
            self.settings,
        )
    }
}
