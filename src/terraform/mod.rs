//! Everything that faces the provisioning tool (Terraform).
//!
//! - [`values`] - projects the internal model into the tool's input values
//! - [`state`] - rebuilds the status from the tool's output variables
//! - [`cli`] - runs the tool binary to read its outputs
//! - [`output_file`] - reads the tool's outputs from a JSON file

mod cli;
mod context;
mod output_file;
mod state;
mod values;

#[cfg(test)]
mod testutil;

pub use cli::{run_in, TerraformCli};
pub use context::InfraContext;
pub use output_file::{parse_output_variables, OutputFile};
pub use state::{
    compute_status, extract_terraform_state, status_from_terraform_state, AvailabilitySetState,
    IdentityState, TerraformState, Terraformer,
};
pub use values::{
    compute_template_values, render_values_json, subnet_output_key, AzureValues, CreateValues,
    IdentityValues, NatGatewayValues, NetworkValues, OutputKeys, PublicIpValues,
    ResourceGroupValues, SubnetValues, TemplateValues, VNetValues,
    OUTPUT_KEY_AVAILABILITY_SET_ID, OUTPUT_KEY_AVAILABILITY_SET_NAME,
    OUTPUT_KEY_COUNT_FAULT_DOMAINS, OUTPUT_KEY_COUNT_UPDATE_DOMAINS, OUTPUT_KEY_IDENTITY_CLIENT_ID,
    OUTPUT_KEY_IDENTITY_ID, OUTPUT_KEY_RESOURCE_GROUP_NAME, OUTPUT_KEY_ROUTE_TABLE_NAME,
    OUTPUT_KEY_SECURITY_GROUP_NAME, OUTPUT_KEY_SUBNET_NAME, OUTPUT_KEY_VNET_NAME,
    OUTPUT_KEY_VNET_RESOURCE_GROUP,
};
