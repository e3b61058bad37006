//! Provisioning pipeline
//!
//! [`PayloadAssembler`] walks the dependency chain top-down: group, cloud,
//! instance type, instance details, version and layout, plan, resource pool,
//! volumes, network interfaces, remaining option types, evars and metadata.
//! Each stage's catalog query is scoped by the selections made before it.
//! Any failure aborts the run and no partial descriptor is returned.

pub mod descriptor;

pub use descriptor::{DeploymentBuilder, DeploymentDescriptor, PlanRef, deep_merge};

use crate::catalog::types::{CatalogOption, InstanceType, Layout, ServicePlan, id_string};
use crate::catalog::{CatalogCache, CatalogProvider, Category};
use crate::context::SelectionContext;
use crate::error::{ProvisionError, Result};
use crate::filter::{ResolvedStages, filter_option_types};
use crate::planner::volumes::plan_datastore_options;
use crate::planner::{
    EntryKind, Volume, VolumePlanner, collect_entries, datastore_options, plan_networks,
};
use crate::resolver::lookup::{find_by_name_or_id, find_cloud, find_group, find_instance_type, find_plan};
use crate::resolver::{OptionDescriptor, OptionResolver, Overrides, Prompter, SelectOption};
use log::{debug, warn};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Top-level keys consumed by named stages
const CONSUMED_KEYS: &[&str] = &[
    "group",
    "cloud",
    "type",
    "name",
    "version",
    "layout",
    "servicePlan",
    "description",
    "environment",
    "instanceContext",
    "tags",
    "volumes",
    "networkInterfaces",
    "rootVolume",
];

/// Per-index planner contexts
static PLANNER_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(dataVolume\d+|networkInterface\d*|evar\d+|metadata\d+)$").unwrap()
});

/// Operator keys that no named stage consumes
pub fn arbitrary_keys(overrides: &Overrides) -> Map<String, Value> {
    overrides
        .as_map()
        .iter()
        .filter(|(key, _)| !CONSUMED_KEYS.contains(&key.as_str()) && !PLANNER_CONTEXT.is_match(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Comma separated tags, trimmed and de-duplicated in order
pub fn parse_tags(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(id_string).collect(),
        other => id_string(other)
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
    };
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Sparse input for one provisioning run
#[derive(Debug, Clone, Default)]
pub struct ProvisionRequest {
    pub group: Option<String>,
    pub cloud: Option<String>,
    pub instance_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub environment: Option<String>,
    pub layout: Option<String>,
    pub plan: Option<String>,
    pub name_required: bool,
    /// Offered as the group prompt's default
    pub default_group: Option<String>,
    /// Offered as the cloud prompt's default
    pub default_cloud: Option<String>,
    pub overrides: Overrides,
}

/// Input for re-planning an existing instance's volumes
#[derive(Debug, Clone, Default)]
pub struct ResizeRequest {
    pub group: String,
    pub cloud: String,
    pub layout: String,
    pub plan: String,
    pub current: Vec<Volume>,
    pub overrides: Overrides,
}

fn option_choices(options: &[CatalogOption]) -> Vec<SelectOption> {
    options.iter().map(CatalogOption::to_select_option).collect()
}

fn plan_choices(plans: &[ServicePlan]) -> Vec<SelectOption> {
    plans
        .iter()
        .map(|p| SelectOption::new(p.name.clone(), p.id))
        .collect()
}

/// The listed entry an answer points at, by key first, then by name or id
fn selected_option(options: &[CatalogOption], chosen: &Value, kind: &'static str) -> Result<CatalogOption> {
    let token = id_string(chosen).unwrap_or_default();
    if let Some(option) = options.iter().find(|o| o.refers_to(&token)) {
        return Ok(option.clone());
    }
    find_by_name_or_id(options, &token, kind).cloned()
}

fn non_empty(value: Option<Value>) -> Option<String> {
    value.as_ref().and_then(id_string).filter(|s| !s.is_empty())
}

pub struct PayloadAssembler<'a> {
    cache: CatalogCache<'a>,
    resolver: OptionResolver<'a>,
}

impl<'a> PayloadAssembler<'a> {
    pub fn new(provider: &'a dyn CatalogProvider, prompter: &'a mut dyn Prompter, no_prompt: bool) -> Self {
        Self {
            cache: CatalogCache::new(provider),
            resolver: OptionResolver::new(prompter, no_prompt),
        }
    }

    fn stage(&mut self, name: &str, description: &str) {
        debug!("Stage: {}", name);
        self.resolver.stage(name, description);
    }

    /// Resolve a select through its token, else prompt from the category
    fn select_group(&mut self, request: &ProvisionRequest) -> Result<CatalogOption> {
        if let Some(token) = &request.group {
            return find_group(&mut self.cache, token);
        }
        let ctx = SelectionContext::new();
        let groups = self.cache.get(&Category::Groups, &ctx, false)?;
        let default = match &request.default_group {
            Some(token) => match find_group(&mut self.cache, token) {
                Ok(group) => Some(Value::String(group.key())),
                Err(e) => {
                    warn!("Ignoring default group {}: {}", token, e);
                    None
                }
            },
            None => None,
        };
        let descriptor = OptionDescriptor::select("group", "Group")
            .required()
            .with_description("Select Group.")
            .with_default(default);
        let chosen = self.resolver.resolve_required(
            &descriptor,
            request.overrides.explicit_for(&descriptor),
            &option_choices(&groups),
        )?;
        selected_option(&groups, &chosen, "Group")
    }

    fn select_cloud(&mut self, request: &ProvisionRequest, ctx: &SelectionContext) -> Result<CatalogOption> {
        if let Some(token) = &request.cloud {
            return find_cloud(&mut self.cache, ctx, token);
        }
        let clouds = self.cache.get(&Category::Clouds, ctx, false)?;
        let default = match &request.default_cloud {
            Some(token) => match find_cloud(&mut self.cache, ctx, token) {
                Ok(cloud) => Some(Value::String(cloud.key())),
                Err(e) => {
                    warn!("Ignoring default cloud {}: {}", token, e);
                    None
                }
            },
            None => None,
        };
        let descriptor = OptionDescriptor::select("cloud", "Cloud")
            .required()
            .with_description("Select Cloud.")
            .with_default(default);
        let chosen = self.resolver.resolve_required(
            &descriptor,
            request.overrides.explicit_for(&descriptor),
            &option_choices(&clouds),
        )?;
        selected_option(&clouds, &chosen, "Cloud")
    }

    fn select_instance_type(
        &mut self,
        request: &ProvisionRequest,
        ctx: &SelectionContext,
    ) -> Result<(InstanceType, String)> {
        let token = match &request.instance_type {
            Some(token) => token.clone(),
            None => {
                let descriptor = OptionDescriptor::select("type", "Type")
                    .with_source(Category::InstanceTypes.source())
                    .required()
                    .with_description("Select Instance Type.");
                let chosen = self
                    .resolver
                    .resolve_field(&descriptor, &request.overrides, &mut self.cache, ctx)?;
                non_empty(chosen).ok_or_else(|| ProvisionError::required("type"))?
            }
        };
        let instance_type = find_instance_type(&mut self.cache, &token)?;
        let code = instance_type.code.clone().unwrap_or(token);
        Ok((instance_type, code))
    }

    /// Name, description, environment and tags
    fn instance_details(&mut self, request: &ProvisionRequest, builder: &mut DeploymentBuilder) -> Result<()> {
        let overrides = &request.overrides;

        let name = request
            .name
            .clone()
            .map(Value::String)
            .or_else(|| overrides.explicit(None, "name").cloned())
            .or_else(|| overrides.explicit(Some("instance"), "name").cloned());
        let descriptor = OptionDescriptor::text("name", "Instance Name").required_if(request.name_required);
        if let Some(name) = non_empty(self.resolver.resolve(&descriptor, name.as_ref(), &[])?) {
            builder.instance("name", name);
        }

        let description = request
            .description
            .clone()
            .map(Value::String)
            .or_else(|| overrides.explicit(None, "description").cloned());
        let descriptor = OptionDescriptor::text("description", "Description");
        if let Some(description) = non_empty(self.resolver.resolve(&descriptor, description.as_ref(), &[])?) {
            builder.instance("description", description);
        }

        let environment = request
            .environment
            .clone()
            .map(Value::String)
            .or_else(|| overrides.explicit(None, "environment").cloned())
            .or_else(|| overrides.explicit(None, "instanceContext").cloned());
        let descriptor = OptionDescriptor::select("environment", "Environment");
        let resolved = match environment {
            Some(explicit) => self.resolver.resolve(&descriptor, Some(&explicit), &[])?,
            None => {
                let environments = self
                    .cache
                    .get(&Category::Environments, &SelectionContext::new(), false)?;
                self.resolver
                    .resolve(&descriptor, None, &option_choices(&environments))?
            }
        };
        if let Some(environment) = non_empty(resolved) {
            builder.instance("instanceContext", environment);
        }

        let descriptor = OptionDescriptor::text("tags", "Tags");
        if let Some(tags) = self.resolver.resolve(&descriptor, overrides.explicit(None, "tags"), &[])? {
            let tags = parse_tags(&tags);
            if !tags.is_empty() {
                builder.instance("tags", tags);
            }
        }
        Ok(())
    }

    /// Version is best-effort: inferred from the layout when one is given,
    /// prompted only when no layout is
    fn select_layout(
        &mut self,
        request: &ProvisionRequest,
        instance_type: &InstanceType,
        ctx: SelectionContext,
    ) -> Result<(Layout, SelectionContext)> {
        let overrides = &request.overrides;
        let layout_token = request
            .layout
            .clone()
            .or_else(|| overrides.reference("instance.layout"))
            .or_else(|| overrides.reference("layout"));
        let explicit_version = overrides
            .explicit(Some("instance"), "version")
            .or_else(|| overrides.explicit(None, "version"))
            .cloned();

        let versions = match self.cache.get(&Category::InstanceVersions, &ctx, false) {
            Ok(versions) => versions,
            Err(e) if layout_token.is_some() && e.is_remote() => {
                debug!("Version list unavailable, continuing with the given layout: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let (layout, ctx) = match &layout_token {
            Some(token) => {
                let layout = instance_type
                    .layout(token)
                    .ok_or_else(|| ProvisionError::not_found("Layout", token.clone()))?;
                let layout_id = layout.id.to_string();
                let inferred = non_empty(explicit_version).or_else(|| {
                    versions
                        .iter()
                        .find(|v| {
                            v.nested("layouts").iter().any(|l| {
                                l.refers_to(&layout_id)
                                    || layout.code.as_deref().is_some_and(|code| l.refers_to(code))
                            })
                        })
                        .map(CatalogOption::key)
                });
                debug!("Version for layout {}: {:?}", layout_id, inferred);
                (layout, ctx.with_version(inferred))
            }
            None => {
                let descriptor = OptionDescriptor::select("version", "Version")
                    .required()
                    .auto_pick()
                    .with_description("Select which version of the instance type to be provisioned.");
                let chosen = self.resolver.resolve(
                    &descriptor,
                    explicit_version.as_ref(),
                    &option_choices(&versions),
                )?;
                let ctx = ctx.with_version(non_empty(chosen));

                let layouts = self.cache.get(&Category::Layouts, &ctx, false)?;
                let descriptor = OptionDescriptor::select("layout", "Layout")
                    .required()
                    .with_description("Select which configuration of the instance type to be provisioned.");
                let chosen = self
                    .resolver
                    .resolve_required(&descriptor, None, &option_choices(&layouts))?;
                let id = id_string(&chosen).unwrap_or_default();
                let layout = instance_type
                    .layout(&id)
                    .ok_or_else(|| ProvisionError::not_found("Layout", format!("id {}", id)))?;
                (layout, ctx)
            }
        };

        let mut ctx = ctx.with_layout(layout.id.to_string());
        if let Some(provision_type_id) = layout.provision_type.as_ref().and_then(|p| p.id) {
            ctx = ctx.with_provision_type(provision_type_id.to_string());
        }
        Ok((layout.clone(), ctx))
    }

    fn select_plan(
        &mut self,
        token: Option<String>,
        overrides: &Overrides,
        ctx: &SelectionContext,
    ) -> Result<ServicePlan> {
        let plans = self.cache.service_plans(ctx, false)?;
        let token = token
            .or_else(|| overrides.reference("servicePlan"))
            .or_else(|| overrides.reference("plan"))
            .or_else(|| overrides.reference("instance.plan"));
        if let Some(token) = token {
            return find_plan(&plans, &token).cloned();
        }
        let descriptor = OptionDescriptor::select("servicePlan", "Plan")
            .required()
            .with_description("Choose the appropriately sized plan for this instance");
        let chosen = self
            .resolver
            .resolve_required(&descriptor, None, &plan_choices(&plans))?;
        let id = id_string(&chosen).unwrap_or_default();
        find_plan(&plans, &id).cloned()
    }

    /// Build the deployment descriptor for a new instance
    pub fn assemble(mut self, request: &ProvisionRequest) -> Result<DeploymentDescriptor> {
        let overrides = &request.overrides;
        let mut builder = DeploymentBuilder::new();

        self.stage("Group", "Where the instance is placed");
        let group = self.select_group(request)?;
        let ctx = SelectionContext::new().with_group(group.key());

        self.stage("Cloud", "Target infrastructure for the group");
        let cloud = self.select_cloud(request, &ctx)?;
        let ctx = ctx.with_cloud(cloud.key());

        self.stage("Instance Type", "What to provision");
        let (instance_type, type_code) = self.select_instance_type(request, &ctx)?;
        let ctx = ctx.with_instance_type(instance_type.id.to_string());

        builder
            .zone(Value::String(cloud.key()))
            .instance("cloud", cloud.name.clone())
            .instance("site", serde_json::json!({"id": group.key()}))
            .instance("type", type_code.clone())
            .instance("instanceType", serde_json::json!({"code": type_code}));

        self.stage("Details", "Name, description, environment and tags");
        self.instance_details(request, &mut builder)?;

        self.stage("Layout", "Version and layout of the instance type");
        let (layout, ctx) = self.select_layout(request, &instance_type, ctx)?;
        builder.instance("layout", serde_json::json!({"id": layout.id}));
        let provision_type = layout.provision_type.clone().unwrap_or_default();

        self.stage("Plan", "Sizing tier");
        let plan = self.select_plan(request.plan.clone(), overrides, &ctx)?;
        let ctx = ctx.with_plan(plan.id.to_string());
        builder.plan(PlanRef {
            id: plan.id,
            code: plan.code.clone(),
            name: plan.name.clone(),
        });

        let has_zone_pools = provision_type.supports_zone_pools();
        if has_zone_pools {
            self.stage("Resource Pool", "Placement target in the cloud");
            let descriptor = OptionDescriptor::select("resourcePoolId", "Resource Pool")
                .in_context("config")
                .with_source(Category::ZonePools.source())
                .required()
                .auto_pick()
                .with_description("Select resource pool.");
            if let Some(pool) = self
                .resolver
                .resolve_field(&descriptor, overrides, &mut self.cache, &ctx)?
            {
                builder.config("resourcePoolId", pool);
            }
        }

        self.stage("Volumes", "Storage for the instance");
        let datastores = datastore_options(&plan, &mut self.cache, &ctx)?;
        let volumes = VolumePlanner::new(&plan, overrides, datastores).plan_new(&mut self.resolver)?;
        let has_volumes = !volumes.is_empty();
        builder.volumes(volumes);

        let mut has_networks = false;
        if provision_type.supports_networks() {
            self.stage("Networks", "Network interfaces");
            match plan_networks(&mut self.cache, &ctx, &provision_type, overrides, &mut self.resolver) {
                Ok(Some(interfaces)) => {
                    has_networks = !interfaces.is_empty();
                    builder.network_interfaces(interfaces);
                }
                Ok(None) => {}
                Err(e) if e.is_remote() => {
                    warn!("Unable to load network options. Proceeding...");
                    debug!("{}", e);
                }
                Err(e) => return Err(e),
            }
        }

        self.stage("Options", "Remaining options for the layout");
        let declared: Vec<OptionDescriptor> = layout
            .option_types
            .iter()
            .chain(instance_type.option_types.iter())
            .chain(provision_type.option_types.iter())
            .cloned()
            .collect();
        let resolved = ResolvedStages {
            volumes: has_volumes,
            networks: has_networks,
            resource_pool: has_zone_pools,
            service_plan: true,
            security_groups: false,
        };
        let remaining = filter_option_types(declared, &resolved);
        let answers = self
            .resolver
            .resolve_all(&remaining, overrides, &mut self.cache, &ctx)?;
        builder.answers(answers);

        self.stage("Environment Variables", "");
        builder.evars(collect_entries(EntryKind::Evar, overrides, &mut self.resolver)?);
        self.stage("Metadata", "");
        builder.metadata(collect_entries(EntryKind::Metadata, overrides, &mut self.resolver)?);

        builder.arbitrary(arbitrary_keys(overrides));
        builder.build(ctx)
    }

    /// Re-plan an existing instance's volumes for a new service plan
    pub fn resize(mut self, request: &ResizeRequest) -> Result<Vec<Volume>> {
        let group = find_group(&mut self.cache, &request.group)?;
        let ctx = SelectionContext::new().with_group(group.key());
        let cloud = find_cloud(&mut self.cache, &ctx, &request.cloud)?;
        let ctx = ctx.with_cloud(cloud.key()).with_layout(request.layout.clone());

        let plans = self.cache.service_plans(&ctx, false)?;
        let plan = find_plan(&plans, &request.plan)?;
        self.stage("Volumes", "Resize storage for the new plan");
        VolumePlanner::new(plan, &request.overrides, plan_datastore_options(plan))
            .plan_resize(&mut self.resolver, &request.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCatalog, ScriptedPrompter, instance_type, network_catalog, plan_with_storage};
    use serde_json::json;

    fn pooled_catalog() -> FakeCatalog {
        let mut mysql = instance_type(5, "MySQL", "mysql");
        if let Some(provision_type) = mysql.instance_type_layouts[0].provision_type.as_mut() {
            provision_type.has_zone_pools = true;
        }
        FakeCatalog::new()
            .with_options("groups", vec![CatalogOption::new("ops", 1)])
            .with_options("clouds", vec![CatalogOption::new("vcenter", 2)])
            .with_options("zonePools", vec![CatalogOption::new("pool-a", "pool-1")])
            .with_instance_type(mysql)
            .with_plans(vec![plan_with_storage(1)])
            .with_networks(network_catalog(Some(1)))
    }

    #[test]
    fn test_pipeline_auto_picks_pool_and_plans_storage() {
        let fake = pooled_catalog();
        let mut prompter = ScriptedPrompter::new();
        let request = ProvisionRequest {
            group: Some("ops".into()),
            cloud: Some("vcenter".into()),
            instance_type: Some("mysql".into()),
            layout: Some("500".into()),
            plan: Some("small".into()),
            overrides: Overrides::parse_assignments(&[
                "networkInterface.networkId=networkGroup-1".to_string(),
                "networkInterface.networkInterfaceTypeId=6".to_string(),
            ])
            .unwrap(),
            ..Default::default()
        };
        let descriptor = PayloadAssembler::new(&fake, &mut prompter, true)
            .assemble(&request)
            .unwrap();

        let body = descriptor.body();
        assert_eq!(body["config"]["resourcePoolId"], json!("pool-1"));
        assert_eq!(
            body["networkInterfaces"],
            json!([{"network": {"id": "networkGroup-1"}, "networkInterfaceTypeId": 6}])
        );
        let root = &descriptor.volumes()[0];
        assert_eq!(root["storageType"], json!(1));
        assert_eq!(root["name"], json!("root"));
        assert_eq!(root["size"], json!(10));
        assert_eq!(descriptor.volumes().len(), 1);
        assert!(body.get("evars").is_none());
        assert_eq!(fake.calls("zonePools"), 1);
    }

    #[test]
    fn test_interactive_run_walks_every_stage() {
        let fake = pooled_catalog();
        let mut prompter = ScriptedPrompter::new();
        let request = ProvisionRequest {
            group: Some("1".into()),
            cloud: Some("2".into()),
            instance_type: Some("5".into()),
            name: Some("db-01".into()),
            layout: Some("mysql-single".into()),
            plan: Some("1".into()),
            overrides: Overrides::parse_assignments(&[
                "networkInterface.networkId=networkGroup-1".to_string(),
                "networkInterface.networkInterfaceTypeId=5".to_string(),
            ])
            .unwrap(),
            ..Default::default()
        };
        let descriptor = PayloadAssembler::new(&fake, &mut prompter, false)
            .assemble(&request)
            .unwrap();
        assert_eq!(descriptor.body()["instance"]["name"], json!("db-01"));
        assert_eq!(
            prompter.stages(),
            vec![
                "Group",
                "Cloud",
                "Instance Type",
                "Details",
                "Layout",
                "Plan",
                "Resource Pool",
                "Volumes",
                "Networks",
                "Options",
                "Environment Variables",
                "Metadata",
            ]
        );
    }

    fn pooled_request() -> ProvisionRequest {
        ProvisionRequest {
            group: Some("ops".into()),
            cloud: Some("vcenter".into()),
            instance_type: Some("mysql".into()),
            layout: Some("500".into()),
            plan: Some("small".into()),
            overrides: Overrides::parse_assignments(&[
                "networkInterface.networkId=networkGroup-1".to_string(),
                "networkInterface.networkInterfaceTypeId=6".to_string(),
            ])
            .unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn test_version_inferred_for_layout_given_by_name() {
        let fake = pooled_catalog().with_options(
            "instanceVersions",
            vec![
                CatalogOption::new("5.7", "5.7").with_extra("layouts", json!([{"id": 700}])),
                CatalogOption::new("8.0", "8.0").with_extra("layouts", json!([{"id": 500}])),
            ],
        );
        let mut prompter = ScriptedPrompter::new();
        let descriptor = PayloadAssembler::new(&fake, &mut prompter, true)
            .assemble(&ProvisionRequest {
                layout: Some("mysql single".into()),
                ..pooled_request()
            })
            .unwrap();
        assert_eq!(descriptor.selection().layout_id.as_deref(), Some("500"));
        assert_eq!(descriptor.selection().version.as_deref(), Some("8.0"));
    }

    #[test]
    fn test_prompted_group_outside_catalog_is_not_found() {
        let fake = pooled_catalog();
        let mut prompter = ScriptedPrompter::new().answer(json!("99"));
        let err = PayloadAssembler::new(&fake, &mut prompter, false)
            .assemble(&ProvisionRequest {
                group: None,
                ..pooled_request()
            })
            .unwrap_err();
        assert!(matches!(err, ProvisionError::NotFound { kind: "Group", .. }));
    }

    #[test]
    fn test_group_override_by_name_resolves_listed_group() {
        let fake = pooled_catalog();
        let mut prompter = ScriptedPrompter::new();
        let mut request = ProvisionRequest {
            group: None,
            ..pooled_request()
        };
        request.overrides.set_path("group", json!("OPS"));
        let descriptor = PayloadAssembler::new(&fake, &mut prompter, true)
            .assemble(&request)
            .unwrap();
        assert_eq!(descriptor.selection().group_id.as_deref(), Some("1"));
        assert!(descriptor.get("group").is_none());
    }

    #[test]
    fn test_tags_are_trimmed_and_unique() {
        assert_eq!(parse_tags(&json!(" web, db ,,web,cache ")), vec!["web", "db", "cache"]);
        assert_eq!(parse_tags(&json!(["a", " a ", "b"])), vec!["a", "b"]);
        assert!(parse_tags(&json!("")).is_empty());
    }

    #[test]
    fn test_consumed_keys_are_not_arbitrary() {
        let overrides = Overrides::new(
            json!({
                "group": "1",
                "tags": "a",
                "rootVolume": {"size": 10},
                "dataVolume2": {"size": 5},
                "networkInterface": {"networkId": 1},
                "networkInterface3": {"networkId": 1},
                "evar0": {"name": "A"},
                "metadata1": {"name": "B"},
                "config": {"hostname": "x"},
                "evars": "kept"
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        );
        let keys = arbitrary_keys(&overrides);
        let mut names: Vec<&String> = keys.keys().collect();
        names.sort();
        assert_eq!(names, vec!["config", "evars"]);
    }
}
