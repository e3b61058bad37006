#![allow(dead_code)]

use provision_cli::catalog::types::{
    CatalogOption, InstanceType, Layout, Network, NetworkCatalog, ProvisionType, ServicePlan,
};
use provision_cli::testing::{FakeCatalog, GB};
use serde_json::json;

pub fn mysql() -> InstanceType {
    InstanceType {
        id: 5,
        name: "MySQL".to_string(),
        code: Some("mysql".to_string()),
        option_types: serde_json::from_value(json!([
            {"fieldName": "osDiskSize", "fieldLabel": "OS Disk", "type": "number", "required": true},
            {"fieldName": "hostname", "fieldContext": "config", "fieldLabel": "Hostname", "type": "text"}
        ]))
        .unwrap_or_default(),
        instance_type_layouts: vec![Layout {
            id: 500,
            name: "MySQL Single".to_string(),
            code: Some("mysql-single".to_string()),
            option_types: Vec::new(),
            provision_type: Some(ProvisionType {
                id: Some(1),
                name: "VMware".to_string(),
                code: Some("vmware".to_string()),
                has_networks: true,
                ..Default::default()
            }),
        }],
    }
}

/// 100 GB plan with no storage menu
pub fn bare_plan() -> ServicePlan {
    ServicePlan {
        id: 10,
        name: "Small".to_string(),
        code: Some("small".to_string()),
        max_storage: Some(100 * GB),
        ..Default::default()
    }
}

/// Groups, clouds, versions and one instance type with a bare plan
pub fn standard_catalog() -> FakeCatalog {
    FakeCatalog::new()
        .with_options(
            "groups",
            vec![CatalogOption::new("Production", 1), CatalogOption::new("Staging", 2)],
        )
        .with_options("clouds", vec![CatalogOption::new("vcenter", 3)])
        .with_options(
            "instanceVersions",
            vec![
                CatalogOption::new("5.7", "5.7")
                    .with_extra("layouts", json!([{"id": 501, "name": "MySQL Cluster"}])),
                CatalogOption::new("5.2", "5.2").with_extra(
                    "layouts",
                    json!([{"id": 500, "name": "MySQL Single", "code": "mysql-single"}]),
                ),
            ],
        )
        .with_instance_type(mysql())
        .with_plans(vec![bare_plan()])
        .with_networks(NetworkCatalog {
            has_networks: false,
            networks: vec![Network {
                id: json!("network-1"),
                name: "vlan-1".to_string(),
                pool: None,
                dhcp_server: Some(json!({"id": 1})),
            }],
            ..Default::default()
        })
}
