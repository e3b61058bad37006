//! Network interface planning

use super::continuation;
use crate::catalog::types::{Network, NetworkCatalog, ProvisionType, id_string};
use crate::catalog::CatalogCache;
use crate::context::SelectionContext;
use crate::error::{ProvisionError, Result};
use crate::resolver::{OptionDescriptor, OptionResolver, Overrides, SelectOption};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub network: NetworkRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_interface_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Field context for the interface at `index`: `networkInterface`, then
/// `networkInterface2`, `networkInterface3`, ...
pub fn interface_context(index: usize) -> String {
    if index == 0 {
        "networkInterface".to_string()
    } else {
        format!("networkInterface{}", index + 1)
    }
}

/// Value of a preset interface field, accepting `network.id` for `networkId`
fn preset_field(preset: Option<&Map<String, Value>>, field: &str) -> Option<Value> {
    let preset = preset?;
    let value = match (preset.get(field), field) {
        (Some(value), _) => Some(value),
        (None, "networkId") => preset.get("network"),
        (None, _) => None,
    };
    value.and_then(id_string).map(Value::String)
}

/// Resolves the interface list for one cloud and provision type
pub struct NetworkPlanner<'a> {
    catalog: &'a NetworkCatalog,
    overrides: &'a Overrides,
}

impl<'a> NetworkPlanner<'a> {
    pub fn new(catalog: &'a NetworkCatalog, overrides: &'a Overrides) -> Self {
        Self { catalog, overrides }
    }

    fn has_preset(&self, index: usize) -> bool {
        self.overrides.preset("networkInterfaces", index).is_some()
            || self.overrides.has(&interface_context(index))
    }

    fn limit_reached(&self, planned: usize) -> bool {
        self.catalog.max_networks.is_some_and(|max| planned >= max)
    }

    /// `None` when the catalog does not offer networking at all
    pub fn resolve(&self, resolver: &mut OptionResolver<'_>) -> Result<Option<Vec<NetworkInterface>>> {
        if !self.catalog.has_networks {
            return Ok(None);
        }
        let networks = self.catalog.all_networks();
        if networks.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let network_choices: Vec<SelectOption> = networks
            .iter()
            .map(|n| SelectOption::new(n.name.clone(), n.id.clone()))
            .collect();
        let type_choices: Vec<SelectOption> = if self.catalog.enable_network_type_selection {
            self.catalog
                .interface_types()
                .iter()
                .map(|t| SelectOption::new(t.name.clone(), t.id))
                .collect()
        } else {
            Vec::new()
        };

        let mut interfaces = Vec::new();
        loop {
            let index = interfaces.len();
            let interface = self.interface(resolver, index, &networks, &network_choices, &type_choices)?;
            interfaces.push(interface);
            let more = continuation::next(
                resolver,
                self.has_preset(index + 1),
                self.limit_reached(interfaces.len()),
                "Add another network interface?",
            )?;
            if !more {
                break;
            }
        }
        Ok(Some(interfaces))
    }

    fn interface(
        &self,
        resolver: &mut OptionResolver<'_>,
        index: usize,
        networks: &[&Network],
        network_choices: &[SelectOption],
        type_choices: &[SelectOption],
    ) -> Result<NetworkInterface> {
        let context = interface_context(index);
        let preset = self.overrides.preset("networkInterfaces", index);

        let descriptor = OptionDescriptor::select("networkId", "Network")
            .in_context(context.clone())
            .required()
            .with_description("Choose a network for this interface.")
            .with_default(preset_field(preset, "networkId"));
        let chosen = resolver.resolve_required(
            &descriptor,
            self.overrides.explicit_for(&descriptor),
            network_choices,
        )?;
        let network_id = id_string(&chosen).unwrap_or_default();
        let network = networks
            .iter()
            .find(|n| n.id_key() == network_id)
            .ok_or_else(|| ProvisionError::not_found("Network", format!("id {}", network_id)))?;

        let mut network_interface_type_id = None;
        if !type_choices.is_empty() {
            let descriptor = OptionDescriptor::select("networkInterfaceTypeId", "Network Interface Type")
                .in_context(context.clone())
                .required()
                .auto_pick()
                .with_description("Choose a network interface type.")
                .with_default(preset_field(preset, "networkInterfaceTypeId"));
            let chosen = resolver.resolve_required(
                &descriptor,
                self.overrides.explicit_for(&descriptor),
                type_choices,
            )?;
            let id = id_string(&chosen)
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| ProvisionError::invalid(descriptor.path(), &chosen))?;
            network_interface_type_id = Some(id);
        }

        let ip_required = network.requires_ip();
        debug!("Network {} requires an IP address: {}", network_id, ip_required);
        let descriptor = OptionDescriptor::text("ipAddress", "IP Address")
            .in_context(context)
            .required_if(ip_required)
            .with_description("Enter an IP for this network interface. x.x.x.x")
            .with_default(preset_field(preset, "ipAddress"));
        let ip_address = resolver
            .resolve(&descriptor, self.overrides.explicit_for(&descriptor), &[])?
            .and_then(|v| id_string(&v))
            .filter(|s| !s.is_empty());

        Ok(NetworkInterface {
            network: NetworkRef { id: network_id },
            network_interface_type_id,
            ip_address,
        })
    }
}

/// Interfaces for the provision type, `None` when it does not support networks
pub fn plan_networks(
    cache: &mut CatalogCache<'_>,
    ctx: &SelectionContext,
    provision_type: &ProvisionType,
    overrides: &Overrides,
    resolver: &mut OptionResolver<'_>,
) -> Result<Option<Vec<NetworkInterface>>> {
    if !provision_type.supports_networks() {
        return Ok(None);
    }
    let catalog = cache.network_options(ctx, false)?;
    NetworkPlanner::new(&catalog, overrides).resolve(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedPrompter, network_catalog};
    use serde_json::json;

    #[test]
    fn test_contexts() {
        assert_eq!(interface_context(0), "networkInterface");
        assert_eq!(interface_context(1), "networkInterface2");
    }

    #[test]
    fn test_no_networking_is_none() {
        let catalog = NetworkCatalog::default();
        let none = Overrides::default();
        let mut prompter = ScriptedPrompter::new();
        let mut resolver = OptionResolver::new(&mut prompter, true);
        let planned = NetworkPlanner::new(&catalog, &none).resolve(&mut resolver).unwrap();
        assert_eq!(planned, None);
    }

    #[test]
    fn test_empty_network_list_is_empty() {
        let catalog = NetworkCatalog {
            has_networks: true,
            ..Default::default()
        };
        let none = Overrides::default();
        let mut prompter = ScriptedPrompter::new();
        let mut resolver = OptionResolver::new(&mut prompter, true);
        let planned = NetworkPlanner::new(&catalog, &none).resolve(&mut resolver).unwrap();
        assert_eq!(planned, Some(Vec::new()));
    }

    #[test]
    fn test_pooled_network_skips_ip() {
        let catalog = network_catalog(None);
        let overrides = Overrides::new(
            json!({"networkInterface": {"networkId": "network-2", "networkInterfaceTypeId": "6"}})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );
        let mut prompter = ScriptedPrompter::new();
        let mut resolver = OptionResolver::new(&mut prompter, true);
        let planned = NetworkPlanner::new(&catalog, &overrides)
            .resolve(&mut resolver)
            .unwrap()
            .unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].network.id, "network-2");
        assert_eq!(planned[0].ip_address, None);
        assert_eq!(planned[0].network_interface_type_id, Some(6));
    }

    #[test]
    fn test_plain_network_requires_ip() {
        let mut catalog = network_catalog(None);
        catalog.enable_network_type_selection = false;
        let overrides = Overrides::new(
            json!({"networkInterface": {"networkId": "network-3"}})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );
        let mut prompter = ScriptedPrompter::new();
        let mut resolver = OptionResolver::new(&mut prompter, true);
        let err = NetworkPlanner::new(&catalog, &overrides)
            .resolve(&mut resolver)
            .unwrap_err();
        assert!(matches!(err, ProvisionError::ValidationRequired { ref field } if field == "networkInterface.ipAddress"));
    }

    #[test]
    fn test_presets_continue_until_max_networks() {
        let mut catalog = network_catalog(Some(2));
        catalog.enable_network_type_selection = false;
        let overrides = Overrides::new(
            json!({
                "networkInterfaces": [
                    {"network": {"id": "networkGroup-1"}},
                    {"networkId": "network-3", "ipAddress": "10.0.0.5"},
                    {"networkId": "network-2"}
                ]
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        );
        let mut prompter = ScriptedPrompter::new();
        let mut resolver = OptionResolver::new(&mut prompter, true);
        let planned = NetworkPlanner::new(&catalog, &overrides)
            .resolve(&mut resolver)
            .unwrap()
            .unwrap();
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].network.id, "networkGroup-1");
        assert_eq!(planned[1].ip_address.as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn test_unknown_network_is_not_found() {
        let catalog = network_catalog(None);
        let mut prompter = ScriptedPrompter::new().answer(json!("network-99"));
        let none = Overrides::default();
        let mut resolver = OptionResolver::new(&mut prompter, false);
        let err = NetworkPlanner::new(&catalog, &none).resolve(&mut resolver).unwrap_err();
        assert!(matches!(err, ProvisionError::NotFound { .. }));
    }

    #[test]
    fn test_serialized_shape() {
        let interface = NetworkInterface {
            network: NetworkRef { id: "network-2".into() },
            network_interface_type_id: None,
            ip_address: Some("10.0.0.9".into()),
        };
        assert_eq!(
            serde_json::to_value(&interface).unwrap(),
            json!({"network": {"id": "network-2"}, "ipAddress": "10.0.0.9"})
        );
    }
}
