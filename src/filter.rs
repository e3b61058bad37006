//! Option type filtering
//!
//! Instance types, layouts and provision types still declare legacy fields
//! for values the planners now capture. Those are dropped before the generic
//! option pass so nothing is asked twice.

use crate::resolver::OptionDescriptor;

pub const VOLUME_FIELDS: &[&str] = &[
    "osDiskSize",
    "osDiskType",
    "diskSize",
    "diskType",
    "datastoreId",
    "storagePodId",
];

pub const NETWORK_FIELDS: &[&str] = &[
    "networkId",
    "networkType",
    "ipAddress",
    "netmask",
    "gateway",
    "nameservers",
    "vmwareNetworkType",
    "vmwareIpAddress",
    "vmwareNetmask",
    "vmwareGateway",
    "vmwareNameservers",
    "subnetId",
];

pub const RESOURCE_POOL_FIELDS: &[&str] = &["resourcePool", "resourcePoolId", "azureResourceGroupId"];

pub const SERVICE_PLAN_FIELDS: &[&str] = &["cpuCount", "memorySize", "memory"];

pub const SECURITY_GROUP_CODE: &str = "provisionType.amazon.securityId";

/// Which specialised stages already produced values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedStages {
    pub volumes: bool,
    pub networks: bool,
    pub resource_pool: bool,
    pub service_plan: bool,
    pub security_groups: bool,
}

impl ResolvedStages {
    fn rejects(&self, descriptor: &OptionDescriptor) -> bool {
        let field = descriptor.field_name.as_str();
        (self.volumes && VOLUME_FIELDS.contains(&field))
            || (self.networks && NETWORK_FIELDS.contains(&field))
            || (self.resource_pool && RESOURCE_POOL_FIELDS.contains(&field))
            || (self.service_plan && SERVICE_PLAN_FIELDS.contains(&field))
            || (self.security_groups
                && (field == "securityId" || descriptor.code.as_deref() == Some(SECURITY_GROUP_CODE)))
    }
}

/// Drop descriptors already satisfied by a resolved stage, keeping order
pub fn filter_option_types(
    descriptors: Vec<OptionDescriptor>,
    resolved: &ResolvedStages,
) -> Vec<OptionDescriptor> {
    descriptors
        .into_iter()
        .filter(|d| !resolved.rejects(d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(descriptors: &[OptionDescriptor]) -> Vec<&str> {
        descriptors.iter().map(|d| d.field_name.as_str()).collect()
    }

    fn declared() -> Vec<OptionDescriptor> {
        [
            "osDiskSize",
            "hostname",
            "vmwareIpAddress",
            "resourcePoolId",
            "cpuCount",
            "securityId",
            "datastoreId",
        ]
        .iter()
        .map(|f| OptionDescriptor::text(*f, *f))
        .collect()
    }

    #[test]
    fn test_nothing_resolved_keeps_everything() {
        let kept = filter_option_types(declared(), &ResolvedStages::default());
        assert_eq!(kept.len(), 7);
    }

    #[test]
    fn test_each_stage_removes_its_fields() {
        let resolved = ResolvedStages {
            volumes: true,
            networks: true,
            resource_pool: true,
            service_plan: true,
            security_groups: false,
        };
        let kept = filter_option_types(declared(), &resolved);
        assert_eq!(fields(&kept), vec!["hostname", "securityId"]);
    }

    #[test]
    fn test_security_group_matched_by_code() {
        let mut by_code = OptionDescriptor::text("groups", "Security Groups");
        by_code.code = Some(SECURITY_GROUP_CODE.to_string());
        let resolved = ResolvedStages {
            security_groups: true,
            ..Default::default()
        };
        let kept = filter_option_types(vec![by_code, OptionDescriptor::text("securityId", "SG")], &resolved);
        assert!(kept.is_empty());
    }
}
