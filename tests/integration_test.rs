//! Integration tests for azure-infra-topology
//!
//! These tests drive a full reconciliation from versioned documents and
//! recorded tool outputs.

use azure_infra_topology::api::{
    decode_infrastructure_config, decode_infrastructure_status, encode_infrastructure_config,
    ApiVersion,
};
use azure_infra_topology::config::PolicySettings;
use azure_infra_topology::error::{InfraError, ToolError};
use azure_infra_topology::models::{Cluster, Purpose, TopologyKind};
use azure_infra_topology::terraform::{render_values_json, OutputFile, Terraformer};
use azure_infra_topology::{read_cluster, read_document, reconcile, Reconciled};
use std::collections::HashMap;
use std::path::Path;

const TEST_DATA: &str = "src/tests/test_data";

fn fixture(name: &str) -> String {
    read_document(&Path::new(TEST_DATA).join(name)).expect("Failed to read fixture")
}

fn cluster(name: &str) -> Cluster {
    read_cluster(&fixture(name)).expect("Failed to parse cluster")
}

fn outputs(name: &str) -> OutputFile {
    OutputFile::new(Path::new(TEST_DATA).join(name))
}

fn run(
    config: &str,
    cluster_file: &str,
    prior_status: Option<&str>,
    tool: Option<&dyn Terraformer>,
) -> Result<Reconciled, InfraError> {
    let prior_status = prior_status.map(fixture);
    reconcile(
        &fixture(config),
        &cluster(cluster_file),
        prior_status.as_deref(),
        tool,
        &PolicySettings::default(),
    )
}

#[test]
fn test_fresh_regional_cluster() {
    let tool = outputs("outputs_regional.json");
    let reconciled = run("config_v1alpha1_regional.json", "cluster.json", None, Some(&tool))
        .expect("Failed to reconcile");

    assert_eq!(reconciled.config_version, ApiVersion::V1alpha1);
    assert_eq!(reconciled.status_version, ApiVersion::V1alpha1);

    let values = &reconciled.values;
    assert!(values.create.resource_group);
    assert!(values.create.availability_set);
    assert_eq!(values.azure.count_fault_domains, Some(2));
    assert_eq!(values.azure.count_update_domains, Some(5));
    assert_eq!(values.output_keys.len(), 9);

    let status = reconciled.status.as_ref().expect("status expected");
    assert_eq!(status.networks.topology, TopologyKind::Regional);
    assert!(!status.zoned);
    assert_eq!(status.networks.subnets.len(), 1);
    assert_eq!(status.networks.subnets[0].name, "shoot--dev--foo-nodes");
    let set = &status.availability_sets[0];
    assert_eq!(set.purpose, Purpose::Nodes);
    assert_eq!(set.name, "shoot--dev--foo-avset-workers");
    assert_eq!(set.count_fault_domains, Some(2));
    assert_eq!(set.count_update_domains, Some(5));

    let json: serde_json::Value =
        serde_json::from_str(reconciled.status_json.as_deref().expect("status json expected"))
            .expect("status json is valid");
    assert_eq!(
        json["apiVersion"],
        "azure.provider.extensions.gardener.cloud/v1alpha1"
    );
    assert_eq!(json["kind"], "InfrastructureStatus");
    assert_eq!(json["availabilitySets"][0]["countUpdateDomains"], 5);
}

#[test]
fn test_zonal_cluster() {
    let tool = outputs("outputs_zonal.json");
    let reconciled = run("config_v1alpha2_zonal.json", "cluster.json", None, Some(&tool))
        .expect("Failed to reconcile");

    let values = serde_json::to_value(&reconciled.values).expect("values serialize");
    assert_eq!(values["create"]["resourceGroup"], false);
    assert_eq!(values["create"]["availabilitySet"], false);
    assert_eq!(values["resourceGroup"]["name"], "my-rg");
    assert_eq!(values["resourceGroup"]["vnet"]["cidr"], "10.250.0.0/16");
    assert!(values["azure"].get("countFaultDomains").is_none());

    let subnets = values["networks"]["subnets"]
        .as_array()
        .expect("subnets array");
    assert_eq!(subnets.len(), 3);
    assert_eq!(subnets[0]["natGateway"]["zone"], 1);
    assert_eq!(subnets[0]["natGateway"]["idleConnectionTimeoutMinutes"], 4);
    assert!(subnets[1].get("natGateway").is_none());
    assert!(subnets[2].get("natGateway").is_none());
    assert_eq!(values["identity"]["name"], "shoot-identity");

    let status = reconciled.status.as_ref().expect("status expected");
    assert_eq!(reconciled.status_version, ApiVersion::V1alpha2);
    assert_eq!(status.networks.topology, TopologyKind::Zonal);
    assert!(status.zoned);
    let subnets: Vec<(&str, Option<i32>)> = status
        .networks
        .subnets
        .iter()
        .map(|s| (s.name.as_str(), s.zone))
        .collect();
    assert_eq!(
        subnets,
        vec![
            ("shoot--dev--foo-z1", Some(1)),
            ("shoot--dev--foo-z2", Some(2)),
            ("shoot--dev--foo-z3", Some(3)),
        ]
    );
    assert!(status.availability_sets.is_empty());
    let identity = status.identity.as_ref().expect("identity expected");
    assert_eq!(identity.client_id, "00000000-0000-0000-0000-000000000001");
    assert!(identity.acr_access);

    let json: serde_json::Value =
        serde_json::from_str(reconciled.status_json.as_deref().expect("status json expected"))
            .expect("status json is valid");
    assert_eq!(json["networks"]["topology"], "zonal");
    assert_eq!(json["networks"]["subnets"][1]["zone"], 2);
    assert_eq!(json["identity"]["clientID"], "00000000-0000-0000-0000-000000000001");
    assert_eq!(json["identity"]["acrAccess"], true);
}

#[test]
fn test_reconcile_is_idempotent() {
    let tool = outputs("outputs_zonal.json");
    let first = run("config_v1alpha2_zonal.json", "cluster.json", None, Some(&tool)).unwrap();
    let second = run("config_v1alpha2_zonal.json", "cluster.json", None, Some(&tool)).unwrap();

    assert_eq!(
        render_values_json(&first.values).unwrap(),
        render_values_json(&second.values).unwrap()
    );
    assert_eq!(first.status, second.status);
    assert_eq!(first.status_json, second.status_json);
}

#[test]
fn test_prior_availability_set_counts_carry_forward() {
    let reconciled = run(
        "config_v1alpha1_regional.json",
        "cluster.json",
        Some("status_v1alpha1_avset.json"),
        None,
    )
    .expect("Failed to reconcile");

    assert!(reconciled.values.create.availability_set);
    assert_eq!(reconciled.values.azure.count_fault_domains, Some(3));
    assert_eq!(reconciled.values.azure.count_update_domains, Some(5));
    assert!(reconciled.status.is_none());
    assert!(reconciled.status_json.is_none());
}

#[test]
fn test_vmo_annotation_after_availability_set_fails() {
    let result = run(
        "config_v1alpha1_regional.json",
        "cluster_vmo.json",
        Some("status_v1alpha1_avset.json"),
        None,
    );
    assert!(matches!(
        result,
        Err(InfraError::IncompatibleOrchestrationModeSwitch)
    ));
}

#[test]
fn test_fresh_vmo_cluster_has_no_availability_set() {
    let reconciled = run("config_v1alpha1_regional.json", "cluster_vmo.json", None, None)
        .expect("Failed to reconcile");
    assert!(!reconciled.values.create.availability_set);
    assert!(!reconciled
        .values
        .output_keys
        .contains("countFaultDomains"));
}

#[test]
fn test_zonal_status_cannot_be_written_as_v1alpha1() {
    let tool = outputs("outputs_zonal.json");
    let result = run(
        "config_v1alpha2_zonal.json",
        "cluster.json",
        Some("status_v1alpha1_avset.json"),
        Some(&tool),
    );
    assert!(matches!(result, Err(InfraError::UnsupportedConversion(_))));
}

struct StaticOutputs(HashMap<String, String>);

impl Terraformer for StaticOutputs {
    fn state_output_variables(
        &self,
        keys: &[String],
    ) -> Result<HashMap<String, String>, ToolError> {
        Ok(keys
            .iter()
            .filter_map(|key| self.0.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }
}

#[test]
fn test_malformed_domain_count_returns_no_status() {
    let vars: HashMap<String, String> = [
        ("resourceGroupName", "rg"),
        ("vnetName", "vnet"),
        ("subnetName", "subnet"),
        ("routeTableName", "rt"),
        ("securityGroupName", "sg"),
        ("availabilitySetID", "avset-id"),
        ("availabilitySetName", "avset"),
        ("countFaultDomains", "abc"),
        ("countUpdateDomains", "5"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let tool = StaticOutputs(vars);

    let result = run("config_v1alpha1_regional.json", "cluster.json", None, Some(&tool));
    assert!(matches!(result, Err(InfraError::MalformedToolOutput(_))));
}

#[test]
fn test_missing_tool_output_fails() {
    let tool = outputs("outputs_regional.json");
    // the zonal config expects subnetName-z0 which the regional outputs lack
    let result = run("config_v1alpha2_zonal.json", "cluster.json", None, Some(&tool));
    assert!(matches!(result, Err(InfraError::MalformedToolOutput(_))));
}

#[test]
fn test_config_generations() {
    let (version, regional) =
        decode_infrastructure_config(&fixture("config_v1alpha1_regional.json")).unwrap();
    assert_eq!(version, ApiVersion::V1alpha1);

    let v1alpha1 = encode_infrastructure_config(&regional, ApiVersion::V1alpha1).unwrap();
    let (_, again) = decode_infrastructure_config(&v1alpha1).unwrap();
    assert_eq!(again, regional);

    let v1alpha2 = encode_infrastructure_config(&regional, ApiVersion::V1alpha2).unwrap();
    let (version, again) = decode_infrastructure_config(&v1alpha2).unwrap();
    assert_eq!(version, ApiVersion::V1alpha2);
    assert_eq!(again, regional);

    let (_, zonal) = decode_infrastructure_config(&fixture("config_v1alpha2_zonal.json")).unwrap();
    assert!(matches!(
        encode_infrastructure_config(&zonal, ApiVersion::V1alpha1),
        Err(InfraError::UnsupportedConversion(_))
    ));
}

#[test]
fn test_v1alpha1_status_topology_is_derived() {
    let (version, status) =
        decode_infrastructure_status(&fixture("status_v1alpha1_avset.json")).unwrap();
    assert_eq!(version, ApiVersion::V1alpha1);
    assert_eq!(status.networks.topology, TopologyKind::Regional);
    assert_eq!(status.availability_sets[0].count_fault_domains, Some(3));
    assert_eq!(status.availability_sets[0].count_update_domains, None);
}
