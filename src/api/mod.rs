//! Versioned configuration and status documents.
//!
//! Two schema generations exist:
//! - [`v1alpha1`] - topology is a `zoned` flag plus one worker CIDR, no zonal setup
//! - [`v1alpha2`] - topology is an explicit three-way union
//!
//! Documents are JSON with `apiVersion`/`kind` type metadata. Decoding peeks the
//! `apiVersion` and converts the matching shape into the internal model.

pub mod v1alpha1;
pub mod v1alpha2;

use crate::error::{InfraError, Result};
use crate::models::{InfrastructureConfig, InfrastructureStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const GROUP_NAME: &str = "azure.provider.extensions.gardener.cloud";
pub const KIND_INFRASTRUCTURE_CONFIG: &str = "InfrastructureConfig";
pub const KIND_INFRASTRUCTURE_STATUS: &str = "InfrastructureStatus";

/// Schema generation of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1alpha1,
    V1alpha2,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1alpha1 => "azure.provider.extensions.gardener.cloud/v1alpha1",
            ApiVersion::V1alpha2 => "azure.provider.extensions.gardener.cloud/v1alpha2",
        }
    }

    pub fn parse(api_version: &str) -> Result<ApiVersion> {
        match api_version.trim().strip_prefix(GROUP_NAME) {
            Some("/v1alpha1") => Ok(ApiVersion::V1alpha1),
            Some("/v1alpha2") => Ok(ApiVersion::V1alpha2),
            _ => Err(InfraError::UnknownApiVersion(api_version.to_string())),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `apiVersion` and `kind` of a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
}

impl TypeMeta {
    pub fn new(version: ApiVersion, kind: &str) -> TypeMeta {
        TypeMeta {
            api_version: version.as_str().to_string(),
            kind: kind.to_string(),
        }
    }
}

/// Deserialize `json`, reporting the JSON path of the first offending field.
pub(crate) fn decode<T: DeserializeOwned>(json: &str, what: &'static str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| InfraError::Decode {
        what,
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

/// Read the type metadata of a document and check its kind.
fn peek_version(json: &str, kind: &'static str) -> Result<ApiVersion> {
    let meta: TypeMeta = decode(json, "type metadata")?;
    if !meta.kind.is_empty() && meta.kind != kind {
        return Err(InfraError::Decode {
            what: kind,
            path: "kind".to_string(),
            message: format!("expected kind {kind}, got {}", meta.kind),
        });
    }
    ApiVersion::parse(&meta.api_version)
}

/// Decode a versioned `InfrastructureConfig` into the internal model.
pub fn decode_infrastructure_config(json: &str) -> Result<(ApiVersion, InfrastructureConfig)> {
    let version = peek_version(json, KIND_INFRASTRUCTURE_CONFIG)?;
    let config: InfrastructureConfig = match version {
        ApiVersion::V1alpha1 => {
            decode::<v1alpha1::InfrastructureConfig>(json, "v1alpha1 InfrastructureConfig")?.into()
        }
        ApiVersion::V1alpha2 => {
            decode::<v1alpha2::InfrastructureConfig>(json, "v1alpha2 InfrastructureConfig")?
                .try_into()?
        }
    };
    log::debug!(
        "decoded {version} InfrastructureConfig with {} topology",
        config.networks.topology.kind()
    );
    Ok((version, config))
}

/// Encode the internal configuration as the given generation.
pub fn encode_infrastructure_config(
    config: &InfrastructureConfig,
    version: ApiVersion,
) -> Result<String> {
    let json = match version {
        ApiVersion::V1alpha1 => {
            serde_json::to_string_pretty(&v1alpha1::InfrastructureConfig::try_from(config)?)?
        }
        ApiVersion::V1alpha2 => {
            serde_json::to_string_pretty(&v1alpha2::InfrastructureConfig::from(config))?
        }
    };
    Ok(json)
}

/// Decode a versioned `InfrastructureStatus` into the internal model.
pub fn decode_infrastructure_status(json: &str) -> Result<(ApiVersion, InfrastructureStatus)> {
    let version = peek_version(json, KIND_INFRASTRUCTURE_STATUS)?;
    let status = match version {
        ApiVersion::V1alpha1 => {
            decode::<v1alpha1::InfrastructureStatus>(json, "v1alpha1 InfrastructureStatus")?.into()
        }
        ApiVersion::V1alpha2 => {
            decode::<v1alpha2::InfrastructureStatus>(json, "v1alpha2 InfrastructureStatus")?.into()
        }
    };
    Ok((version, status))
}

/// Encode the internal status as the given generation.
///
/// A zonal status cannot be written as `v1alpha1`.
pub fn encode_infrastructure_status(
    status: &InfrastructureStatus,
    version: ApiVersion,
) -> Result<String> {
    let json = match version {
        ApiVersion::V1alpha1 => {
            serde_json::to_string_pretty(&v1alpha1::InfrastructureStatus::try_from(status)?)?
        }
        ApiVersion::V1alpha2 => {
            serde_json::to_string_pretty(&v1alpha2::InfrastructureStatus::from(status))?
        }
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TopologyKind;

    #[test]
    fn test_api_version_parse() {
        assert_eq!(
            ApiVersion::parse("azure.provider.extensions.gardener.cloud/v1alpha1").unwrap(),
            ApiVersion::V1alpha1
        );
        assert_eq!(
            ApiVersion::parse(ApiVersion::V1alpha2.as_str()).unwrap(),
            ApiVersion::V1alpha2
        );
        assert!(matches!(
            ApiVersion::parse("azure.provider.extensions.gardener.cloud/v1beta1"),
            Err(InfraError::UnknownApiVersion(_))
        ));
        assert!(ApiVersion::parse("").is_err());
    }

    #[test]
    fn test_decode_reports_path() {
        let json = r#"{
            "apiVersion": "azure.provider.extensions.gardener.cloud/v1alpha1",
            "kind": "InfrastructureConfig",
            "networks": { "workers": "10.250.0.0" }
        }"#;
        match decode_infrastructure_config(json) {
            Err(InfraError::Decode { path, .. }) => assert_eq!(path, "networks.workers"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_wrong_kind() {
        let json = r#"{
            "apiVersion": "azure.provider.extensions.gardener.cloud/v1alpha1",
            "kind": "InfrastructureStatus",
            "networks": { "workers": "10.250.0.0/19" }
        }"#;
        assert!(decode_infrastructure_config(json).is_err());
    }

    #[test]
    fn test_decode_v1alpha2_multiple_topologies_is_invalid() {
        let json = r#"{
            "apiVersion": "azure.provider.extensions.gardener.cloud/v1alpha2",
            "kind": "InfrastructureConfig",
            "networks": {
                "regional": { "cidr": "10.250.0.0/19" },
                "singleSubnetZonal": { "cidr": "10.250.0.0/19" }
            }
        }"#;
        assert!(matches!(
            decode_infrastructure_config(json),
            Err(InfraError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_encode_config_between_generations() {
        let json = r#"{
            "apiVersion": "azure.provider.extensions.gardener.cloud/v1alpha1",
            "kind": "InfrastructureConfig",
            "networks": { "workers": "10.250.0.0/19", "serviceEndpoints": ["Microsoft.Storage"] },
            "zoned": true
        }"#;
        let (version, config) = decode_infrastructure_config(json).unwrap();
        assert_eq!(version, ApiVersion::V1alpha1);
        assert_eq!(
            config.networks.topology.kind(),
            TopologyKind::SingleSubnetZonal
        );

        let v2 = encode_infrastructure_config(&config, ApiVersion::V1alpha2).unwrap();
        let (version, again) = decode_infrastructure_config(&v2).unwrap();
        assert_eq!(version, ApiVersion::V1alpha2);
        assert_eq!(again, config);
    }
}
