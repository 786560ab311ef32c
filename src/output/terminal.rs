//! Terminal output utilities.
//!
//! Renders an infrastructure status as aligned, coloured lines.

use crate::models::{InfrastructureStatus, Purpose};
use colored::Colorize;

/// Format a value as a quoted field.
pub fn format_field<T: ToString>(value: T) -> String {
    format!("\"{}\"", value.to_string())
}

fn purpose(purpose: Purpose) -> &'static str {
    match purpose {
        Purpose::Nodes => "nodes",
        Purpose::Internal => "internal",
    }
}

fn line(label: &str, value: String) -> String {
    format!("{label:>16}: {value}", label = label.bold())
}

/// Summarise a status, one resource per line.
pub fn status_summary(status: &InfrastructureStatus) -> Vec<String> {
    let mut lines = vec![
        line("topology", status.networks.topology.to_string().green().to_string()),
        line("zoned", status.zoned.to_string()),
        line("resourceGroup", format_field(&status.resource_group.name)),
    ];

    let vnet = match &status.networks.vnet.resource_group {
        Some(rg) => format!(
            "{} in {}",
            format_field(&status.networks.vnet.name),
            format_field(rg)
        ),
        None => format_field(&status.networks.vnet.name),
    };
    lines.push(line("vnet", vnet));

    for subnet in &status.networks.subnets {
        let zone = subnet
            .zone
            .map(|zone| format!(" zone={zone}"))
            .unwrap_or_default();
        lines.push(line(
            "subnet",
            format!(
                "{} purpose={}{zone}",
                format_field(&subnet.name),
                purpose(subnet.purpose)
            ),
        ));
    }

    for set in &status.availability_sets {
        let counts = match (set.count_fault_domains, set.count_update_domains) {
            (Some(fault), Some(update)) => format!(" fault={fault} update={update}"),
            _ => " counts=unknown".yellow().to_string(),
        };
        lines.push(line(
            "availabilitySet",
            format!(
                "{} purpose={}{counts}",
                format_field(&set.name),
                purpose(set.purpose)
            ),
        ));
    }

    for table in &status.route_tables {
        lines.push(line("routeTable", format_field(&table.name)));
    }
    for group in &status.security_groups {
        lines.push(line("securityGroup", format_field(&group.name)));
    }

    match &status.identity {
        Some(identity) => {
            let acr = if identity.acr_access {
                "acrAccess".green().to_string()
            } else {
                "noAcrAccess".dimmed().to_string()
            };
            lines.push(line(
                "identity",
                format!("{} {acr}", format_field(&identity.client_id)),
            ));
        }
        None => lines.push(line("identity", "none".dimmed().to_string())),
    }

    lines
}

/// Print the status summary to stdout.
pub fn print_status(status: &InfrastructureStatus) {
    println!("#{}#", " infrastructure status ".on_blue());
    for line in status_summary(status) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AvailabilitySet, IdentityStatus, NetworkStatus, ResourceGroup, RouteTable, Subnet,
        TopologyKind, VNetStatus,
    };

    fn status() -> InfrastructureStatus {
        InfrastructureStatus {
            resource_group: ResourceGroup {
                name: "rg".to_string(),
            },
            networks: NetworkStatus {
                vnet: VNetStatus {
                    name: "vnet".to_string(),
                    resource_group: Some("vnet-rg".to_string()),
                },
                subnets: vec![
                    Subnet {
                        name: "subnet-1".to_string(),
                        purpose: Purpose::Nodes,
                        zone: Some(1),
                    },
                    Subnet {
                        name: "subnet-2".to_string(),
                        purpose: Purpose::Nodes,
                        zone: Some(2),
                    },
                ],
                topology: TopologyKind::Zonal,
            },
            availability_sets: vec![],
            route_tables: vec![RouteTable {
                purpose: Purpose::Nodes,
                name: "rt".to_string(),
            }],
            security_groups: vec![],
            identity: None,
            zoned: true,
        }
    }

    #[test]
    fn test_format_field() {
        assert_eq!(format_field("test"), "\"test\"");
        assert_eq!(format_field(42), "\"42\"");
    }

    #[test]
    fn test_status_summary() {
        colored::control::set_override(false);
        let lines = status_summary(&status());
        assert_eq!(lines[0], "        topology: Zonal");
        assert!(lines.contains(&"            vnet: \"vnet\" in \"vnet-rg\"".to_string()));
        assert!(lines.contains(&"          subnet: \"subnet-2\" purpose=nodes zone=2".to_string()));
        assert!(lines.contains(&"      routeTable: \"rt\"".to_string()));
        assert_eq!(lines.last().unwrap(), "        identity: none");
    }

    #[test]
    fn test_status_summary_availability_set_and_identity() {
        colored::control::set_override(false);
        let mut status = status();
        status.availability_sets.push(AvailabilitySet {
            purpose: Purpose::Nodes,
            id: "id".to_string(),
            name: "avset".to_string(),
            count_fault_domains: Some(2),
            count_update_domains: Some(5),
        });
        status.identity = Some(IdentityStatus {
            id: "id".to_string(),
            client_id: "client".to_string(),
            acr_access: true,
        });
        let lines = status_summary(&status);
        assert!(lines
            .contains(&" availabilitySet: \"avset\" purpose=nodes fault=2 update=5".to_string()));
        assert_eq!(lines.last().unwrap(), "        identity: \"client\" acrAccess");
    }
}
