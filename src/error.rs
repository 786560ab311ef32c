//! Error types for topology conversion, projection and status reconstruction.
//!
//! Every error is terminal for the current reconciliation pass. Nothing in this
//! crate retries; the caller re-invokes on its own schedule.

use thiserror::Error;

/// Boxed error returned by the external provisioning tool.
pub type ToolError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while handling infrastructure configuration and status.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("unsupported conversion: {0}")]
    UnsupportedConversion(String),

    #[error("can not extrapolate vNet CIDR in Zonal network setup")]
    CannotDeriveVNetCidr,

    #[error("cannot use vmss orchestration mode VM (VMO) as this cluster already used an availability set")]
    IncompatibleOrchestrationModeSwitch,

    #[error("malformed tool output: {0}")]
    MalformedToolOutput(String),

    #[error("invalid CIDR: {0}")]
    InvalidCidr(String),

    #[error("error decoding {what}: path={path} error={message}")]
    Decode {
        what: &'static str,
        path: String,
        message: String,
    },

    #[error("unknown apiVersion '{0}'")]
    UnknownApiVersion(String),

    #[error("could not find a {kind} domain count for region {region}")]
    DomainCountNotFound { kind: &'static str, region: String },

    #[error(transparent)]
    Tool(ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InfraError>;
