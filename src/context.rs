//! Accumulated selections for one provisioning run
//!
//! Each stage adds the identifier it resolved. Later catalog queries are
//! scoped by these identifiers, so a context only ever grows.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionContext {
    pub group_id: Option<String>,
    pub cloud_id: Option<String>,
    pub instance_type_id: Option<String>,
    pub layout_id: Option<String>,
    /// Best-effort: inferred from the layout when not chosen
    pub version: Option<String>,
    pub plan_id: Option<String>,
    pub provision_type_id: Option<String>,
}

impl SelectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(self, id: impl Into<String>) -> Self {
        Self {
            group_id: Some(id.into()),
            ..self
        }
    }

    pub fn with_cloud(self, id: impl Into<String>) -> Self {
        Self {
            cloud_id: Some(id.into()),
            ..self
        }
    }

    pub fn with_instance_type(self, id: impl Into<String>) -> Self {
        Self {
            instance_type_id: Some(id.into()),
            ..self
        }
    }

    pub fn with_layout(self, id: impl Into<String>) -> Self {
        Self {
            layout_id: Some(id.into()),
            ..self
        }
    }

    /// A missing version leaves the context unchanged
    pub fn with_version(self, version: Option<String>) -> Self {
        Self {
            version: version.or(self.version),
            ..self
        }
    }

    pub fn with_plan(self, id: impl Into<String>) -> Self {
        Self {
            plan_id: Some(id.into()),
            ..self
        }
    }

    pub fn with_provision_type(self, id: impl Into<String>) -> Self {
        Self {
            provision_type_id: Some(id.into()),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_grows() {
        let ctx = SelectionContext::new()
            .with_group("1")
            .with_cloud("2")
            .with_version(Some("5.2".into()))
            .with_version(None);
        assert_eq!(ctx.group_id.as_deref(), Some("1"));
        assert_eq!(ctx.cloud_id.as_deref(), Some("2"));
        assert_eq!(ctx.version.as_deref(), Some("5.2"));
        assert!(ctx.plan_id.is_none());
    }
}
