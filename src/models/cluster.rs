//! Cluster level context: region, annotations and cloud profile defaults.

use crate::config::VMO_ANNOTATION;
use crate::error::{InfraError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Domain count for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCount {
    pub region: String,
    pub count: i32,
}

/// Per-region fault and update domain defaults from the cloud profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProfileConfig {
    #[serde(default)]
    pub count_fault_domains: Vec<DomainCount>,
    #[serde(default)]
    pub count_update_domains: Vec<DomainCount>,
}

fn find_domain_count_by_region(
    counts: &[DomainCount],
    region: &str,
    kind: &'static str,
) -> Result<i32> {
    counts
        .iter()
        .find(|count| count.region == region)
        .map(|count| count.count)
        .ok_or_else(|| InfraError::DomainCountNotFound {
            kind,
            region: region.to_string(),
        })
}

impl CloudProfileConfig {
    pub fn fault_domains_for(&self, region: &str) -> Result<i32> {
        find_domain_count_by_region(&self.count_fault_domains, region, "fault")
    }

    pub fn update_domains_for(&self, region: &str) -> Result<i32> {
        find_domain_count_by_region(&self.count_update_domains, region, "update")
    }
}

/// The cluster an infrastructure belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Technical cluster name, also the default resource group and VNet name.
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub cloud_profile: CloudProfileConfig,
}

impl Cluster {
    /// True if the cluster opted out of availability sets.
    pub fn has_vmo_annotation(&self) -> bool {
        self.annotations
            .get(VMO_ANNOTATION)
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}
