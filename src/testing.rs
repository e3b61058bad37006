//! In-memory catalog and scripted prompter shared by unit and integration tests

use crate::catalog::error::{self, CatalogApiError};
use crate::catalog::types::{
    CatalogOption, InstanceType, Layout, Network, NetworkCatalog, NetworkInterfaceType,
    ProvisionType, ServicePlan, StorageType,
};
use crate::catalog::{CatalogParams, CatalogProvider, Category};
use crate::error::Result;
use crate::resolver::{PromptRequest, Prompter};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

pub const GB: u64 = 1024 * 1024 * 1024;

#[derive(Default)]
pub struct FakeCatalog {
    options: HashMap<String, Vec<CatalogOption>>,
    failing: HashSet<String>,
    instance_types: Vec<InstanceType>,
    plans: Vec<ServicePlan>,
    networks: NetworkCatalog,
    calls: RefCell<HashMap<String, usize>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, source: &str, entries: Vec<CatalogOption>) -> Self {
        self.options.insert(source.to_string(), entries);
        self
    }

    pub fn failing(mut self, source: &str) -> Self {
        self.failing.insert(source.to_string());
        self
    }

    pub fn with_instance_type(mut self, instance_type: InstanceType) -> Self {
        self.instance_types.push(instance_type);
        self
    }

    pub fn with_plans(mut self, plans: Vec<ServicePlan>) -> Self {
        self.plans = plans;
        self
    }

    pub fn with_networks(mut self, networks: NetworkCatalog) -> Self {
        self.networks = networks;
        self
    }

    /// How many times a source was fetched
    pub fn calls(&self, source: &str) -> usize {
        self.calls.borrow().get(source).copied().unwrap_or(0)
    }

    fn record(&self, source: &str) -> error::Result<()> {
        *self.calls.borrow_mut().entry(source.to_string()).or_default() += 1;
        if self.failing.contains(source) {
            return Err(CatalogApiError::Unavailable {
                status: 503,
                message: format!("{} unavailable", source),
            });
        }
        Ok(())
    }
}

impl CatalogProvider for FakeCatalog {
    fn options(&self, source: &str, _params: &CatalogParams) -> error::Result<Vec<CatalogOption>> {
        self.record(source)?;
        Ok(self.options.get(source).cloned().unwrap_or_default())
    }

    fn instance_type(&self, id: i64) -> error::Result<Option<InstanceType>> {
        self.record(Category::InstanceTypes.source())?;
        Ok(self.instance_types.iter().find(|t| t.id == id).cloned())
    }

    fn search_instance_types(&self, token: &str) -> error::Result<Vec<InstanceType>> {
        self.record(Category::InstanceTypes.source())?;
        let token = token.to_lowercase();
        Ok(self
            .instance_types
            .iter()
            .filter(|t| {
                t.name.to_lowercase() == token || t.code.as_deref().is_some_and(|c| c.to_lowercase() == token)
            })
            // Search results are summaries without layouts
            .map(|t| InstanceType {
                instance_type_layouts: Vec::new(),
                ..t.clone()
            })
            .collect())
    }

    fn service_plans(&self, _params: &CatalogParams) -> error::Result<Vec<ServicePlan>> {
        self.record(Category::ServicePlans.source())?;
        Ok(self.plans.clone())
    }

    fn network_options(&self, _params: &CatalogParams) -> error::Result<NetworkCatalog> {
        self.record(Category::Networks.source())?;
        Ok(self.networks.clone())
    }
}

/// Prompter that replays queued answers and records what was asked
///
/// Once the queue runs dry, `ask` returns the prompt's default and
/// `confirm` answers no.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<Value>>,
    confirms: VecDeque<bool>,
    asked: Vec<String>,
    defaults: Vec<Option<Value>>,
    confirmations: usize,
    stages: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, value: Value) -> Self {
        self.answers.push_back(Some(value));
        self
    }

    /// Queue a blank answer
    pub fn skip(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    pub fn confirming(mut self, yes: bool) -> Self {
        self.confirms.push_back(yes);
        self
    }

    /// Paths of every field prompted, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.clone()
    }

    pub fn defaults(&self) -> Vec<Option<Value>> {
        self.defaults.clone()
    }

    pub fn confirmations(&self) -> usize {
        self.confirmations
    }

    pub fn stages(&self) -> Vec<String> {
        self.stages.clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, request: &PromptRequest<'_>) -> Result<Option<Value>> {
        self.asked.push(request.descriptor.path());
        self.defaults.push(request.default.cloned());
        Ok(match self.answers.pop_front() {
            Some(answer) => answer,
            None => request.default.cloned(),
        })
    }

    fn confirm(&mut self, _message: &str, _default: bool) -> Result<bool> {
        self.confirmations += 1;
        Ok(self.confirms.pop_front().unwrap_or(false))
    }

    fn stage(&mut self, name: &str, _description: &str) {
        self.stages.push(name.to_string());
    }
}

/// Instance type with one layout on a networked provision type
pub fn instance_type(id: i64, name: &str, code: &str) -> InstanceType {
    InstanceType {
        id,
        name: name.to_string(),
        code: Some(code.to_string()),
        option_types: Vec::new(),
        instance_type_layouts: vec![Layout {
            id: id * 100,
            name: format!("{} Single", name),
            code: Some(format!("{}-single", code)),
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

/// 10 GB plan with one root and one data storage type, both customizable
pub fn plan_with_storage(max_disk: usize) -> ServicePlan {
    ServicePlan {
        id: 1,
        name: "Small".to_string(),
        code: Some("small".to_string()),
        max_storage: Some(10 * GB),
        max_disk: Some(max_disk),
        root_storage_types: vec![StorageType {
            id: 1,
            name: "Thin".to_string(),
            code: Some("thin".to_string()),
            custom_label: true,
            custom_size: true,
        }],
        storage_types: vec![StorageType {
            id: 2,
            name: "Thick".to_string(),
            code: Some("thick".to_string()),
            custom_label: true,
            custom_size: true,
        }],
        root_disk_customizable: true,
        customize_volume: true,
        add_volumes: true,
        ..Default::default()
    }
}

/// A pooled network, a plain network and one network group
pub fn network_catalog(max_networks: Option<usize>) -> NetworkCatalog {
    NetworkCatalog {
        networks: vec![
            Network {
                id: json!("network-2"),
                name: "pooled".to_string(),
                pool: Some(json!({"id": 3})),
                dhcp_server: None,
            },
            Network {
                id: json!("network-3"),
                name: "plain".to_string(),
                pool: None,
                dhcp_server: None,
            },
        ],
        network_groups: vec![Network {
            id: json!("networkGroup-1"),
            name: "all".to_string(),
            pool: None,
            dhcp_server: None,
        }],
        network_types: vec![
            NetworkInterfaceType {
                id: 5,
                name: "E1000".to_string(),
                display_order: 2,
            },
            NetworkInterfaceType {
                id: 6,
                name: "VMXNET3".to_string(),
                display_order: 1,
            },
        ],
        enable_network_type_selection: true,
        has_networks: true,
        max_networks,
    }
}
