//! Azure infrastructure topology handling.
//!
//! Normalises versioned `InfrastructureConfig` documents into one internal
//! model, projects the model into the input values of the Terraform
//! infrastructure chart, and rebuilds the `InfrastructureStatus` from the
//! tool's output variables.
//!
//! - [`api`] - versioned documents and their conversions
//! - [`models`] - internal value types
//! - [`processing`] - availability-set policy and domain counts
//! - [`terraform`] - value projection, status reconstruction, tool adapters
//! - [`output`] - terminal rendering

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;
pub mod terraform;

use api::ApiVersion;
use config::PolicySettings;
use error::Result;
use models::{Cluster, InfrastructureStatus};
use std::path::Path;
use terraform::{InfraContext, TemplateValues, Terraformer};

/// Result of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Generation of the configuration document.
    pub config_version: ApiVersion,
    pub values: TemplateValues,
    /// Set when the tool outputs were read.
    pub status: Option<InfrastructureStatus>,
    /// Generation the status is written as.
    pub status_version: ApiVersion,
    /// The status encoded as `status_version`.
    pub status_json: Option<String>,
}

/// Read a document from disk.
pub fn read_document(path: &Path) -> Result<String> {
    log::debug!("reading {}", path.display());
    Ok(std::fs::read_to_string(path)?)
}

/// Parse the cluster context.
pub fn read_cluster(json: &str) -> Result<Cluster> {
    api::decode(json, "Cluster")
}

/// Run one reconciliation pass.
///
/// Decodes the configuration and prior status, projects the template values
/// and, when `tool` is given, reads its outputs and encodes the new status.
///
/// # Arguments
/// * `config_json` - Versioned `InfrastructureConfig` document
/// * `cluster` - Cluster context
/// * `prior_status_json` - Status written by the previous pass, if any
/// * `tool` - Source of the tool's output variables, `None` to only project
/// * `settings` - Policy settings
///
/// # Returns
/// * `Ok(Reconciled)` - Values and, with a tool, the status
/// * `Err` - The first error; no status is produced on failure
pub fn reconcile(
    config_json: &str,
    cluster: &Cluster,
    prior_status_json: Option<&str>,
    tool: Option<&dyn Terraformer>,
    settings: &PolicySettings,
) -> Result<Reconciled> {
    let (config_version, config) = api::decode_infrastructure_config(config_json)?;
    let prior = prior_status_json
        .map(api::decode_infrastructure_status)
        .transpose()?;
    let status_version = prior
        .as_ref()
        .map_or(config_version, |(version, _)| *version);
    let prior_status = prior.as_ref().map(|(_, status)| status);

    log::info!(
        "reconciling {} ({config_version}, prior status: {})",
        cluster.name,
        prior.as_ref().map_or("none".to_string(), |(v, _)| v.to_string())
    );

    let ctx = InfraContext::new(&config, cluster, prior_status, settings);
    let values = terraform::compute_template_values(&ctx)?;

    let (status, status_json) = match tool {
        Some(tool) => {
            let status = terraform::compute_status(tool, &ctx)?;
            let json = api::encode_infrastructure_status(&status, status_version)?;
            (Some(status), Some(json))
        }
        None => (None, None),
    };

    Ok(Reconciled {
        config_version,
        values,
        status,
        status_version,
        status_json,
    })
}
