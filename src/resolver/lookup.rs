//! Name/id disambiguation for catalog lookups
//!
//! A purely numeric token is an id; anything else is a case-insensitive
//! exact name match that must hit exactly one entry.

use crate::catalog::types::{CatalogOption, InstanceType, ServicePlan};
use crate::catalog::{CatalogCache, Category};
use crate::context::SelectionContext;
use crate::error::{Candidate, ProvisionError, Result};
use regex::Regex;
use std::sync::LazyLock;

static NUMERIC_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

pub fn is_numeric_token(token: &str) -> bool {
    NUMERIC_TOKEN.is_match(token)
}

/// Something a lookup can match by id or name
pub trait Named {
    fn id_key(&self) -> String;
    fn display_name(&self) -> &str;

    fn matches_name(&self, token: &str) -> bool {
        self.display_name().to_lowercase() == token.to_lowercase()
    }
}

impl Named for CatalogOption {
    fn id_key(&self) -> String {
        self.key()
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Named for InstanceType {
    fn id_key(&self) -> String {
        self.id.to_string()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    /// Instance types are also addressed by code
    fn matches_name(&self, token: &str) -> bool {
        self.name.to_lowercase() == token.to_lowercase() || self.code.as_deref() == Some(token)
    }
}

impl Named for ServicePlan {
    fn id_key(&self) -> String {
        self.id.to_string()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn matches_name(&self, token: &str) -> bool {
        self.name.to_lowercase() == token.to_lowercase() || self.code.as_deref() == Some(token)
    }
}

/// Reduce a set of name matches to the single hit
pub fn unique<'a, T: Named>(
    matches: Vec<&'a T>,
    token: &str,
    kind: &'static str,
) -> Result<&'a T> {
    match matches.as_slice() {
        [] => Err(ProvisionError::not_found(kind, format!("name {}", token))),
        [single] => Ok(*single),
        many => Err(ProvisionError::Ambiguous {
            kind,
            token: token.to_string(),
            candidates: many
                .iter()
                .map(|m| Candidate {
                    id: m.id_key(),
                    name: m.display_name().to_string(),
                })
                .collect(),
        }),
    }
}

pub fn find_by_name_or_id<'a, T: Named>(
    items: &'a [T],
    token: &str,
    kind: &'static str,
) -> Result<&'a T> {
    if is_numeric_token(token) {
        items
            .iter()
            .find(|item| item.id_key() == token)
            .ok_or_else(|| ProvisionError::not_found(kind, format!("id {}", token)))
    } else {
        unique(
            items.iter().filter(|item| item.matches_name(token)).collect(),
            token,
            kind,
        )
    }
}

pub fn find_group(cache: &mut CatalogCache<'_>, token: &str) -> Result<CatalogOption> {
    let groups = cache.get(&Category::Groups, &SelectionContext::new(), false)?;
    find_by_name_or_id(&groups, token, "Group").cloned()
}

pub fn find_cloud(
    cache: &mut CatalogCache<'_>,
    ctx: &SelectionContext,
    token: &str,
) -> Result<CatalogOption> {
    let clouds = cache.get(&Category::Clouds, ctx, false)?;
    find_by_name_or_id(&clouds, token, "Cloud").cloned()
}

/// Numeric tokens fetch by id; others search by name or code and re-fetch
/// the single hit for full layout details
pub fn find_instance_type(cache: &mut CatalogCache<'_>, token: &str) -> Result<InstanceType> {
    let id = if is_numeric_token(token) {
        token
            .parse::<i64>()
            .map_err(|_| ProvisionError::not_found("Instance Type", format!("id {}", token)))?
    } else {
        let found = cache.search_instance_types(token)?;
        unique(
            found.iter().filter(|t| t.matches_name(token)).collect(),
            token,
            "Instance Type",
        )?
        .id
    };
    cache
        .instance_type(id)?
        .ok_or_else(|| ProvisionError::not_found("Instance Type", format!("id {}", id)))
}

/// Plans are matched by id, name or code
pub fn find_plan<'a>(plans: &'a [ServicePlan], token: &str) -> Result<&'a ServicePlan> {
    if let Some(plan) = plans.iter().find(|p| p.id.to_string() == token) {
        return Ok(plan);
    }
    unique(
        plans.iter().filter(|p| p.matches(token)).collect(),
        token,
        "Plan",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCatalog;

    fn groups() -> Vec<CatalogOption> {
        vec![
            CatalogOption::new("Production", 1),
            CatalogOption::new("Staging", 2),
            CatalogOption::new("production", 7),
        ]
    }

    #[test]
    fn test_numeric_tokens() {
        assert!(is_numeric_token("42"));
        assert!(!is_numeric_token("42a"));
        assert!(!is_numeric_token(""));
        assert!(!is_numeric_token("-1"));
    }

    #[test]
    fn test_find_group_ambiguous_lists_both_ids() {
        let fake = FakeCatalog::new().with_options("groups", groups());
        let mut cache = CatalogCache::new(&fake);
        match find_group(&mut cache, "Production") {
            Err(ProvisionError::Ambiguous { candidates, .. }) => {
                let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["1", "7"]);
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_find_by_id_and_name() {
        let items = groups();
        assert_eq!(find_by_name_or_id(&items, "7", "Group").unwrap().name, "production");
        assert_eq!(find_by_name_or_id(&items, "staging", "Group").unwrap().key(), "2");
        assert!(matches!(
            find_by_name_or_id(&items, "9", "Group"),
            Err(ProvisionError::NotFound { .. })
        ));
        assert!(matches!(
            find_by_name_or_id(&items, "Dev", "Group"),
            Err(ProvisionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_find_instance_type_by_code_refetches_detail() {
        let fake = FakeCatalog::new().with_instance_type(crate::testing::instance_type(5, "MySQL", "mysql"));
        let mut cache = CatalogCache::new(&fake);
        let found = find_instance_type(&mut cache, "mysql").unwrap();
        assert_eq!(found.id, 5);
        assert!(!found.instance_type_layouts.is_empty());
        assert!(matches!(
            find_instance_type(&mut cache, "99"),
            Err(ProvisionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_find_plan_by_code_or_name() {
        let plans = vec![
            ServicePlan {
                id: 10,
                name: "Small".into(),
                code: Some("small".into()),
                ..Default::default()
            },
            ServicePlan {
                id: 11,
                name: "Large".into(),
                code: Some("large".into()),
                ..Default::default()
            },
        ];
        assert_eq!(find_plan(&plans, "11").unwrap().name, "Large");
        assert_eq!(find_plan(&plans, "small").unwrap().id, 10);
        assert_eq!(find_plan(&plans, "LARGE").unwrap().id, 11);
        assert!(find_plan(&plans, "medium").is_err());
    }
}
