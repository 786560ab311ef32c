//! Constants and environment driven settings.

use crate::error::{InfraError, Result};

/// log4rs configuration read by the binary.
pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

/// Selects how a prior status without a "nodes" availability set is treated.
pub const ENV_LEGACY_STATUS_POLICY: &str = "AZURE_INFRA_LEGACY_STATUS_POLICY";

/// Terraform binary used by [`crate::terraform::TerraformCli`].
pub const ENV_TERRAFORM_BIN: &str = "AZURE_INFRA_TERRAFORM_BIN";

pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";

/// Cluster annotation opting out of availability sets (VMSS orchestration mode VM).
pub const VMO_ANNOTATION: &str = "alpha.azure.provider.extensions.gardener.cloud/vmo";

/// Upper bound for the stdout of a tool command.
pub const MAX_COMMAND_OUTPUT_BYTES: usize = 500_000;

/// Behaviour for a regional cluster whose prior status carries no "nodes"
/// availability set and no opt-out annotation.
///
/// Such statuses come from very old writers. Product has not settled whether
/// they should get an availability set, so the branch is explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyStatusPolicy {
    /// Re-derive as for a new cluster: regional clusters get an availability set.
    #[default]
    Derive,
    /// Keep the cluster without an availability set.
    NotRequired,
}

impl std::str::FromStr for LegacyStatusPolicy {
    type Err = InfraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "derive" => Ok(LegacyStatusPolicy::Derive),
            "not-required" | "notrequired" => Ok(LegacyStatusPolicy::NotRequired),
            other => Err(InfraError::Decode {
                what: ENV_LEGACY_STATUS_POLICY,
                path: ".".to_string(),
                message: format!("unknown policy '{other}', expected 'derive' or 'not-required'"),
            }),
        }
    }
}

/// Settings consulted by the availability-set policy and the tool adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySettings {
    pub legacy_status: LegacyStatusPolicy,
    pub terraform_bin: String,
}

impl Default for PolicySettings {
    fn default() -> Self {
        PolicySettings {
            legacy_status: LegacyStatusPolicy::default(),
            terraform_bin: DEFAULT_TERRAFORM_BIN.to_string(),
        }
    }
}

impl PolicySettings {
    /// Build settings from the process environment (call `dotenv` first to
    /// pick up a `.env` file).
    pub fn from_env() -> Result<Self> {
        let legacy_status = match std::env::var(ENV_LEGACY_STATUS_POLICY) {
            Ok(value) => value.parse()?,
            Err(_) => LegacyStatusPolicy::default(),
        };
        let terraform_bin = std::env::var(ENV_TERRAFORM_BIN)
            .ok()
            .filter(|bin| !bin.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TERRAFORM_BIN.to_string());

        log::debug!("settings: legacy_status={legacy_status:?} terraform_bin={terraform_bin}");
        Ok(PolicySettings {
            legacy_status,
            terraform_bin,
        })
    }
}
