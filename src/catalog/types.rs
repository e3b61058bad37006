//! Catalog entity types
//!
//! These mirror the remote catalog payloads: generic option lists, instance
//! types with their layouts and provision types, service plans, and the
//! zone network options document.

use crate::resolver::descriptor::{OptionDescriptor, SelectOption};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// Treat an explicit JSON `null` the same as a missing field
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list that may be `null` and may contain `null` entries
fn compact_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items.into_iter().flatten().collect())
}

/// Accept `true`, `"on"` or `"true"` as an enabled flag
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s == "on" || s == "true",
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        _ => false,
    })
}

fn whole_number(value: Option<Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// A non-negative quantity that may arrive as a number or a numeric string
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(whole_number(Option::<Value>::deserialize(deserializer)?))
}

/// A positive count that may arrive as a number or a numeric string
fn positive_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = whole_number(Option::<Value>::deserialize(deserializer)?);
    Ok(count.filter(|c| *c > 0).map(|c| c as usize))
}

/// Render an identifier-like JSON value as the string used for comparisons
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get("id").and_then(id_string),
        Value::Array(_) => Some(value.to_string()),
    }
}

/// Whether a JSON identifier refers to the given id
pub fn id_matches(value: &Value, id: &str) -> bool {
    id_string(value).is_some_and(|v| v == id)
}

/// Generic entry from an options source (`groups`, `clouds`, `instanceVersions`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Category-specific attributes (`zoneTypeId`, `layouts`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogOption {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: None,
            name: name.into(),
            value: value.into(),
            code: None,
            extra: Map::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// The identifier used for selection: `value` when present, else `id`
    pub fn key(&self) -> String {
        id_string(&self.value)
            .or_else(|| self.id.as_ref().and_then(id_string))
            .unwrap_or_default()
    }

    /// Decode a nested list attribute such as a version's `layouts`
    pub fn nested(&self, field: &str) -> Vec<CatalogOption> {
        self.extra
            .get(field)
            .and_then(|v| serde_json::from_value::<Vec<Option<CatalogOption>>>(v.clone()).ok())
            .map(|items| items.into_iter().flatten().collect())
            .unwrap_or_default()
    }

    /// Whether any of id, value or code equals the token
    pub fn refers_to(&self, token: &str) -> bool {
        id_matches(&self.value, token)
            || self.id.as_ref().is_some_and(|id| id_matches(id, token))
            || self.code.as_deref() == Some(token)
    }

    pub fn to_select_option(&self) -> SelectOption {
        let value = if self.value.is_null() {
            self.id.clone().unwrap_or(Value::Null)
        } else {
            self.value.clone()
        };
        SelectOption::new(self.name.clone(), value)
    }
}

/// Instance type with its layouts, as returned by the instance type detail endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceType {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "compact_list")]
    pub option_types: Vec<OptionDescriptor>,
    #[serde(default, deserialize_with = "compact_list")]
    pub instance_type_layouts: Vec<Layout>,
}

impl InstanceType {
    /// Find one of this type's layouts by id, code or name
    pub fn layout(&self, token: &str) -> Option<&Layout> {
        self.instance_type_layouts.iter().find(|l| {
            l.id.to_string() == token
                || l.code.as_deref() == Some(token)
                || l.name.to_lowercase() == token.to_lowercase()
        })
    }
}

/// A deployable configuration of an instance type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "compact_list")]
    pub option_types: Vec<OptionDescriptor>,
    #[serde(default)]
    pub provision_type: Option<ProvisionType>,
}

/// Infrastructure driver bound to a layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionType {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub has_zone_pools: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub has_networks: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub has_datastore: bool,
    #[serde(default, deserialize_with = "compact_list")]
    pub option_types: Vec<OptionDescriptor>,
}

impl ProvisionType {
    pub fn supports_zone_pools(&self) -> bool {
        self.id.is_some() && self.has_zone_pools
    }

    pub fn supports_networks(&self) -> bool {
        self.id.is_some() && self.has_networks
    }
}

/// Storage type offered by a service plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageType {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub custom_label: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub custom_size: bool,
}

/// Priced size choice for a storage type; `key` is what gets sent as `sizeId`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeOption {
    pub key: Value,
    #[serde(default, deserialize_with = "nullable")]
    pub value: String,
}

/// Sizing tier for a layout, including its storage menu
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePlan {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Storage ceiling in bytes
    #[serde(default, deserialize_with = "lenient_u64")]
    pub max_storage: Option<u64>,
    #[serde(default, deserialize_with = "positive_count")]
    pub max_disk: Option<usize>,
    #[serde(default, deserialize_with = "compact_list")]
    pub root_storage_types: Vec<StorageType>,
    #[serde(default, deserialize_with = "compact_list")]
    pub storage_types: Vec<StorageType>,
    /// Datastores grouped by kind (`store`, `cluster`, ...)
    #[serde(default, deserialize_with = "nullable")]
    pub datastores: BTreeMap<String, Vec<Option<CatalogOption>>>,
    #[serde(default, deserialize_with = "compact_list")]
    pub auto_options: Vec<CatalogOption>,
    #[serde(default, deserialize_with = "nullable")]
    pub root_custom_size_options: BTreeMap<String, Vec<Option<SizeOption>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub custom_size_options: BTreeMap<String, Vec<Option<SizeOption>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub root_disk_customizable: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub customize_volume: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub add_volumes: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub supports_auto_datastore: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub has_datastore: bool,
}

impl ServicePlan {
    /// Storage ceiling converted to whole GB
    pub fn size_gb(&self) -> Option<u64> {
        self.max_storage.map(|bytes| bytes / BYTES_PER_GB)
    }

    /// Volume limit including the root volume; zero means unbounded
    pub fn disk_limit(&self) -> Option<usize> {
        self.max_disk.filter(|m| *m > 0)
    }

    /// Look up a storage type by id among data and root storage types
    pub fn storage_type(&self, id: &Value) -> Option<&StorageType> {
        let id = id_string(id)?;
        self.storage_types
            .iter()
            .chain(self.root_storage_types.iter())
            .find(|st| st.id.to_string() == id)
    }

    pub fn matches(&self, token: &str) -> bool {
        self.id.to_string() == token
            || self.code.as_deref() == Some(token)
            || self.name.to_lowercase() == token.to_lowercase()
    }
}

/// Network or network group offered for an interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: Value,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub pool: Option<Value>,
    #[serde(default)]
    pub dhcp_server: Option<Value>,
}

impl Network {
    pub fn id_key(&self) -> String {
        id_string(&self.id).unwrap_or_default()
    }

    pub fn is_group(&self) -> bool {
        self.id_key().contains("networkGroup")
    }

    /// A plain network without a pool or DHCP needs an explicit address
    pub fn requires_ip(&self) -> bool {
        !(self.is_group() || self.pool.is_some() || self.dhcp_server.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceType {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub display_order: i64,
}

/// Zone network options for a cloud and provision type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkCatalog {
    #[serde(default, deserialize_with = "compact_list")]
    pub networks: Vec<Network>,
    #[serde(default, deserialize_with = "compact_list")]
    pub network_groups: Vec<Network>,
    #[serde(default, deserialize_with = "compact_list")]
    pub network_types: Vec<NetworkInterfaceType>,
    #[serde(default, deserialize_with = "flag")]
    pub enable_network_type_selection: bool,
    #[serde(default, deserialize_with = "flag")]
    pub has_networks: bool,
    #[serde(default, deserialize_with = "positive_count")]
    pub max_networks: Option<usize>,
}

impl NetworkCatalog {
    /// Network groups first, then plain networks
    pub fn all_networks(&self) -> Vec<&Network> {
        self.network_groups.iter().chain(self.networks.iter()).collect()
    }

    pub fn interface_types(&self) -> Vec<&NetworkInterfaceType> {
        let mut types: Vec<&NetworkInterfaceType> = self.network_types.iter().collect();
        types.sort_by_key(|t| t.display_order);
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_size_converts_bytes_to_gb() {
        let plan = ServicePlan {
            id: 1,
            max_storage: Some(107_374_182_400),
            ..Default::default()
        };
        assert_eq!(plan.size_gb(), Some(100));
    }

    #[test]
    fn test_plan_tolerates_nulls() {
        let plan: ServicePlan = serde_json::from_value(json!({
            "id": 4,
            "name": "Small",
            "rootStorageTypes": [null, {"id": 1, "name": "Standard", "customSize": true}],
            "storageTypes": null,
            "datastores": null,
            "addVolumes": null,
            "maxDisk": 3
        }))
        .unwrap();
        assert_eq!(plan.root_storage_types.len(), 1);
        assert!(plan.storage_types.is_empty());
        assert!(!plan.add_volumes);
        assert_eq!(plan.disk_limit(), Some(3));
        assert_eq!(plan.storage_type(&json!("1")).map(|s| s.id), Some(1));
    }

    #[test]
    fn test_plan_limits_accept_numeric_strings() {
        let plan: ServicePlan = serde_json::from_value(json!({
            "id": 5,
            "maxDisk": "3",
            "maxStorage": "21474836480"
        }))
        .unwrap();
        assert_eq!(plan.disk_limit(), Some(3));
        assert_eq!(plan.size_gb(), Some(20));

        let unbounded: ServicePlan = serde_json::from_value(json!({"id": 6, "maxDisk": 0, "maxStorage": null})).unwrap();
        assert_eq!(unbounded.disk_limit(), None);
        assert_eq!(unbounded.size_gb(), None);
    }

    #[test]
    fn test_network_catalog_flags() {
        let catalog: NetworkCatalog = serde_json::from_value(json!({
            "networks": [{"id": "network-2", "name": "internal"}],
            "networkGroups": [{"id": "networkGroup-9", "name": "all"}],
            "networkTypes": [
                {"id": 5, "name": "E1000", "displayOrder": 2},
                {"id": 6, "name": "VMXNET3", "displayOrder": 1}
            ],
            "enableNetworkTypeSelection": "on",
            "hasNetworks": true,
            "maxNetworks": "0"
        }))
        .unwrap();
        assert!(catalog.enable_network_type_selection);
        assert_eq!(catalog.max_networks, None);
        let names: Vec<&str> = catalog.all_networks().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["all", "internal"]);
        assert_eq!(catalog.interface_types()[0].id, 6);
    }

    #[test]
    fn test_ip_requirement() {
        let plain = Network {
            id: json!("network-1"),
            name: "plain".into(),
            pool: None,
            dhcp_server: None,
        };
        assert!(plain.requires_ip());

        let pooled = Network {
            pool: Some(json!({"id": 3, "name": "pool"})),
            ..plain.clone()
        };
        assert!(!pooled.requires_ip());

        let dhcp = Network {
            dhcp_server: Some(json!(true)),
            ..plain.clone()
        };
        assert!(!dhcp.requires_ip());

        let group = Network {
            id: json!("networkGroup-4"),
            ..plain
        };
        assert!(!group.requires_ip());
    }

    #[test]
    fn test_option_key_and_nested() {
        let version = CatalogOption::new("5.2", "5.2").with_extra(
            "layouts",
            json!([{"id": 11, "name": "Single", "value": 11, "code": "single-5.2"}, null]),
        );
        let layouts = version.nested("layouts");
        assert_eq!(layouts.len(), 1);
        assert!(layouts[0].refers_to("11"));
        assert!(layouts[0].refers_to("single-5.2"));
        assert_eq!(version.key(), "5.2");
    }
}
