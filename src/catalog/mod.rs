//! Remote catalog access
//!
//! [`CatalogProvider`] is the seam to the remote catalog. [`CatalogCache`]
//! memoizes every read per (category, context) for one provisioning run, so
//! repeated loops (one prompt per data volume, per interface) reuse a single
//! fetch.

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpCatalogProvider;
pub use error::CatalogApiError;
pub use types::{
    CatalogOption, InstanceType, Layout, Network, NetworkCatalog, NetworkInterfaceType,
    ProvisionType, ServicePlan, SizeOption, StorageType,
};

use crate::context::SelectionContext;
use crate::error::{ProvisionError, Result};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Read operations against the remote catalog
///
/// Every call is single-attempt; retries belong to the transport.
pub trait CatalogProvider {
    /// Entries of a named options source, scoped by `params`
    fn options(&self, source: &str, params: &CatalogParams) -> error::Result<Vec<CatalogOption>>;

    /// Full instance type detail, `None` when the id is unknown
    fn instance_type(&self, id: i64) -> error::Result<Option<InstanceType>>;

    /// Instance types whose name or code matches the token
    fn search_instance_types(&self, token: &str) -> error::Result<Vec<InstanceType>>;

    fn service_plans(&self, params: &CatalogParams) -> error::Result<Vec<ServicePlan>>;

    fn network_options(&self, params: &CatalogParams) -> error::Result<NetworkCatalog>;
}

/// Catalog categories, each with its options source name and context scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Groups,
    Clouds,
    InstanceTypes,
    InstanceVersions,
    Layouts,
    ZonePools,
    Datastores,
    Environments,
    ServicePlans,
    Networks,
    /// Any other dynamic source named by an option descriptor
    Source(String),
}

impl Category {
    pub fn from_source(source: &str) -> Self {
        match source {
            "groups" => Self::Groups,
            "clouds" => Self::Clouds,
            "instanceTypes" => Self::InstanceTypes,
            "instanceVersions" => Self::InstanceVersions,
            "layoutsForCloud" => Self::Layouts,
            "zonePools" => Self::ZonePools,
            "datastores" => Self::Datastores,
            "environments" => Self::Environments,
            "zoneNetworkOptions" => Self::Networks,
            other => Self::Source(other.to_string()),
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Self::Groups => "groups",
            Self::Clouds => "clouds",
            Self::InstanceTypes => "instanceTypes",
            Self::InstanceVersions => "instanceVersions",
            Self::Layouts => "layoutsForCloud",
            Self::ZonePools => "zonePools",
            Self::Datastores => "datastores",
            Self::Environments => "environments",
            Self::ServicePlans => "servicePlans",
            Self::Networks => "zoneNetworkOptions",
            Self::Source(name) => name,
        }
    }

    /// The context key for this category: only the ids its query depends on
    pub fn scope(&self, ctx: &SelectionContext) -> CatalogParams {
        let params = CatalogParams::new();
        match self {
            Self::Groups | Self::Environments => params,
            Self::Clouds | Self::InstanceTypes => params.with("groupId", &ctx.group_id),
            Self::InstanceVersions => params
                .with("groupId", &ctx.group_id)
                .with("cloudId", &ctx.cloud_id)
                .with("instanceTypeId", &ctx.instance_type_id),
            Self::Layouts => params
                .with("groupId", &ctx.group_id)
                .with("cloudId", &ctx.cloud_id)
                .with("instanceTypeId", &ctx.instance_type_id)
                .with("version", &ctx.version),
            Self::ZonePools => params
                .with("groupId", &ctx.group_id)
                .with("siteId", &ctx.group_id)
                .with("zoneId", &ctx.cloud_id)
                .with("cloudId", &ctx.cloud_id)
                .with("instanceTypeId", &ctx.instance_type_id)
                .with("planId", &ctx.plan_id)
                .with("layoutId", &ctx.layout_id),
            Self::Datastores | Self::ServicePlans => params
                .with("zoneId", &ctx.cloud_id)
                .with("layoutId", &ctx.layout_id)
                .with("siteId", &ctx.group_id),
            Self::Networks => params
                .with("zoneId", &ctx.cloud_id)
                .with("provisionTypeId", &ctx.provision_type_id),
            Self::Source(_) => params
                .with("groupId", &ctx.group_id)
                .with("siteId", &ctx.group_id)
                .with("cloudId", &ctx.cloud_id)
                .with("zoneId", &ctx.cloud_id)
                .with("instanceTypeId", &ctx.instance_type_id)
                .with("layoutId", &ctx.layout_id)
                .with("version", &ctx.version)
                .with("planId", &ctx.plan_id),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Query parameters for a catalog read; ordered so it can key the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CatalogParams(BTreeMap<&'static str, String>);

impl CatalogParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter when the value is known
    pub fn with(mut self, key: &'static str, value: &Option<String>) -> Self {
        if let Some(v) = value {
            self.0.insert(key, v.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Environments offered when the remote list cannot be loaded
pub fn static_environments() -> Vec<CatalogOption> {
    vec![
        CatalogOption::new("Dev", "dev"),
        CatalogOption::new("Test", "qa"),
        CatalogOption::new("Staging", "staging"),
        CatalogOption::new("Production", "production"),
    ]
}

/// Per-run memoized view over a [`CatalogProvider`]
pub struct CatalogCache<'a> {
    provider: &'a dyn CatalogProvider,
    options: HashMap<(Category, CatalogParams), Vec<CatalogOption>>,
    plans: HashMap<CatalogParams, Vec<ServicePlan>>,
    networks: HashMap<CatalogParams, NetworkCatalog>,
    instance_types: HashMap<i64, InstanceType>,
}

impl<'a> CatalogCache<'a> {
    pub fn new(provider: &'a dyn CatalogProvider) -> Self {
        Self {
            provider,
            options: HashMap::new(),
            plans: HashMap::new(),
            networks: HashMap::new(),
            instance_types: HashMap::new(),
        }
    }

    /// Entries for a category under the context's scope
    ///
    /// Fetched at most once per (category, scope) unless `refresh` is set.
    /// `environments` falls back to a static list when the fetch fails.
    pub fn get(
        &mut self,
        category: &Category,
        ctx: &SelectionContext,
        refresh: bool,
    ) -> Result<Vec<CatalogOption>> {
        let params = category.scope(ctx);
        let key = (category.clone(), params);
        if !refresh {
            if let Some(cached) = self.options.get(&key) {
                debug!("Catalog cache hit for {}", category);
                return Ok(cached.clone());
            }
        }

        debug!("Fetching {} from catalog with {:?}", category, key.1);
        let fetched = match self.provider.options(category.source(), &key.1) {
            Ok(entries) => entries,
            Err(e) if *category == Category::Environments => {
                debug!("Unable to determine available environments, using default options: {}", e);
                static_environments()
            }
            Err(source) => {
                return Err(ProvisionError::RemoteUnavailable {
                    category: category.to_string(),
                    source,
                });
            }
        };
        self.options.insert(key, fetched.clone());
        Ok(fetched)
    }

    pub fn service_plans(
        &mut self,
        ctx: &SelectionContext,
        refresh: bool,
    ) -> Result<Vec<ServicePlan>> {
        let params = Category::ServicePlans.scope(ctx);
        if !refresh {
            if let Some(cached) = self.plans.get(&params) {
                return Ok(cached.clone());
            }
        }
        debug!("Fetching service plans with {:?}", params);
        let plans = self
            .provider
            .service_plans(&params)
            .map_err(|source| ProvisionError::RemoteUnavailable {
                category: Category::ServicePlans.to_string(),
                source,
            })?;
        self.plans.insert(params, plans.clone());
        Ok(plans)
    }

    pub fn network_options(
        &mut self,
        ctx: &SelectionContext,
        refresh: bool,
    ) -> Result<NetworkCatalog> {
        let params = Category::Networks.scope(ctx);
        if !refresh {
            if let Some(cached) = self.networks.get(&params) {
                return Ok(cached.clone());
            }
        }
        debug!("Fetching network options with {:?}", params);
        let catalog = self
            .provider
            .network_options(&params)
            .map_err(|source| ProvisionError::RemoteUnavailable {
                category: Category::Networks.to_string(),
                source,
            })?;
        self.networks.insert(params, catalog.clone());
        Ok(catalog)
    }

    /// Instance type detail by id, memoized
    pub fn instance_type(&mut self, id: i64) -> Result<Option<InstanceType>> {
        if let Some(cached) = self.instance_types.get(&id) {
            return Ok(Some(cached.clone()));
        }
        let found = self
            .provider
            .instance_type(id)
            .map_err(|source| ProvisionError::RemoteUnavailable {
                category: Category::InstanceTypes.to_string(),
                source,
            })?;
        if let Some(instance_type) = &found {
            self.instance_types.insert(id, instance_type.clone());
        }
        Ok(found)
    }

    /// Name/code search; not memoized since the token is free-form
    pub fn search_instance_types(&mut self, token: &str) -> Result<Vec<InstanceType>> {
        self.provider
            .search_instance_types(token)
            .map_err(|source| ProvisionError::RemoteUnavailable {
                category: Category::InstanceTypes.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCatalog;

    #[test]
    fn test_get_fetches_once_per_scope() {
        let fake = FakeCatalog::new()
            .with_options("clouds", vec![CatalogOption::new("aws", 2)]);
        let mut cache = CatalogCache::new(&fake);
        let ctx = SelectionContext::new().with_group("1");

        cache.get(&Category::Clouds, &ctx, false).unwrap();
        cache.get(&Category::Clouds, &ctx, false).unwrap();
        assert_eq!(fake.calls("clouds"), 1);

        // A different group is a different context key
        cache
            .get(&Category::Clouds, &SelectionContext::new().with_group("3"), false)
            .unwrap();
        assert_eq!(fake.calls("clouds"), 2);

        cache.get(&Category::Clouds, &ctx, true).unwrap();
        assert_eq!(fake.calls("clouds"), 3);
    }

    #[test]
    fn test_scope_ignores_unrelated_ids() {
        let fake = FakeCatalog::new().with_options("groups", vec![CatalogOption::new("a", 1)]);
        let mut cache = CatalogCache::new(&fake);
        cache
            .get(&Category::Groups, &SelectionContext::new(), false)
            .unwrap();
        cache
            .get(&Category::Groups, &SelectionContext::new().with_cloud("9"), false)
            .unwrap();
        assert_eq!(fake.calls("groups"), 1);
    }

    #[test]
    fn test_environments_fall_back_to_static_list() {
        let fake = FakeCatalog::new().failing("environments");
        let mut cache = CatalogCache::new(&fake);
        let envs = cache
            .get(&Category::Environments, &SelectionContext::new(), false)
            .unwrap();
        let names: Vec<&str> = envs.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Dev", "Test", "Staging", "Production"]);
    }

    #[test]
    fn test_other_failures_are_remote_unavailable() {
        let fake = FakeCatalog::new().failing("groups");
        let mut cache = CatalogCache::new(&fake);
        let err = cache
            .get(&Category::Groups, &SelectionContext::new(), false)
            .unwrap_err();
        assert!(matches!(err, ProvisionError::RemoteUnavailable { ref category, .. } if category == "groups"));
    }

    #[test]
    fn test_source_round_trip() {
        for source in ["groups", "layoutsForCloud", "zonePools", "zoneNetworkOptions"] {
            assert_eq!(Category::from_source(source).source(), source);
        }
        assert_eq!(
            Category::from_source("securityGroups"),
            Category::Source("securityGroups".to_string())
        );
    }
}
