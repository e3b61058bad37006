//! Deployment descriptor composition
//!
//! Stages hand their results to a [`DeploymentBuilder`]; nothing is merged
//! until [`DeploymentBuilder::build`], which applies one ordered pass:
//! arbitrary operator keys, then generic option answers, then the values
//! from the named stages. Later layers win on overlapping keys.

use crate::context::SelectionContext;
use crate::error::Result;
use crate::planner::{Entry, NetworkInterface, Volume};
use serde::Serialize;
use serde_json::{Map, Value};

/// Recursively merge `overlay` into `base`; non-object values replace
pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Identity of the chosen plan as sent in the payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRef {
    pub id: i64,
    pub code: Option<String>,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct DeploymentBuilder {
    arbitrary: Map<String, Value>,
    answers: Map<String, Value>,
    zone_id: Option<Value>,
    instance: Map<String, Value>,
    plan: Option<PlanRef>,
    config: Map<String, Value>,
    volumes: Vec<Volume>,
    network_interfaces: Vec<NetworkInterface>,
    evars: Vec<Entry>,
    metadata: Vec<Entry>,
}

impl DeploymentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operator keys not consumed by any stage
    pub fn arbitrary(&mut self, keys: Map<String, Value>) -> &mut Self {
        self.arbitrary = keys;
        self
    }

    /// Answers from the generic option pass
    pub fn answers(&mut self, answers: Map<String, Value>) -> &mut Self {
        deep_merge(&mut self.answers, answers);
        self
    }

    pub fn zone(&mut self, id: impl Into<Value>) -> &mut Self {
        self.zone_id = Some(id.into());
        self
    }

    pub fn instance(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.instance.insert(key.to_string(), value.into());
        self
    }

    pub fn plan(&mut self, plan: PlanRef) -> &mut Self {
        self.plan = Some(plan);
        self
    }

    pub fn config(&mut self, key: &str, value: Value) -> &mut Self {
        self.config.insert(key.to_string(), value);
        self
    }

    pub fn volumes(&mut self, volumes: Vec<Volume>) -> &mut Self {
        self.volumes = volumes;
        self
    }

    pub fn network_interfaces(&mut self, interfaces: Vec<NetworkInterface>) -> &mut Self {
        self.network_interfaces = interfaces;
        self
    }

    pub fn evars(&mut self, evars: Vec<Entry>) -> &mut Self {
        self.evars = evars;
        self
    }

    pub fn metadata(&mut self, metadata: Vec<Entry>) -> &mut Self {
        self.metadata = metadata;
        self
    }

    /// Values of the named stages; empty lists are left out
    fn structured(self) -> Result<Map<String, Value>> {
        let mut body = Map::new();
        if let Some(zone_id) = self.zone_id {
            body.insert("zoneId".into(), zone_id);
        }
        let mut instance = self.instance;
        if let Some(plan) = self.plan {
            let plan = serde_json::to_value(plan)?;
            instance.insert("plan".into(), plan.clone());
            body.insert("plan".into(), plan);
        }
        if !instance.is_empty() {
            body.insert("instance".into(), Value::Object(instance));
        }
        if !self.config.is_empty() {
            body.insert("config".into(), Value::Object(self.config));
        }
        if !self.volumes.is_empty() {
            body.insert("volumes".into(), serde_json::to_value(self.volumes)?);
        }
        if !self.network_interfaces.is_empty() {
            body.insert(
                "networkInterfaces".into(),
                serde_json::to_value(self.network_interfaces)?,
            );
        }
        if !self.evars.is_empty() {
            body.insert("evars".into(), serde_json::to_value(self.evars)?);
        }
        if !self.metadata.is_empty() {
            body.insert("metadata".into(), serde_json::to_value(self.metadata)?);
        }
        Ok(body)
    }

    pub fn build(mut self, selection: SelectionContext) -> Result<DeploymentDescriptor> {
        let mut body = std::mem::take(&mut self.arbitrary);
        deep_merge(&mut body, std::mem::take(&mut self.answers));
        deep_merge(&mut body, self.structured()?);
        Ok(DeploymentDescriptor { body, selection })
    }
}

/// The assembled request body plus the selections that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentDescriptor {
    body: Map<String, Value>,
    selection: SelectionContext,
}

impl DeploymentDescriptor {
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn selection(&self) -> &SelectionContext {
        &self.selection
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn volumes(&self) -> &[Value] {
        self.body
            .get("volumes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.body)?)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_deep_merge_nests_and_replaces_arrays() {
        let mut base = object(json!({"config": {"a": 1, "b": 2}, "tags": ["x", "y"], "keep": true}));
        deep_merge(
            &mut base,
            object(json!({"config": {"b": 3, "c": 4}, "tags": ["z"]})),
        );
        assert_eq!(
            Value::Object(base),
            json!({"config": {"a": 1, "b": 3, "c": 4}, "tags": ["z"], "keep": true})
        );
    }

    #[test]
    fn test_named_stages_win_over_arbitrary_keys() {
        let mut builder = DeploymentBuilder::new();
        builder
            .arbitrary(object(json!({
                "config": {"resourcePoolId": "user", "hostname": "h1"},
                "zoneId": 99,
                "customKey": {"nested": true}
            })))
            .answers(object(json!({"config": {"hostname": "from-answer", "userGroup": 2}})))
            .zone(3)
            .config("resourcePoolId", json!(7))
            .instance("name", "web-01");
        let descriptor = builder.build(SelectionContext::new()).unwrap();

        assert_eq!(descriptor.get("zoneId"), Some(&json!(3)));
        assert_eq!(
            descriptor.get("config"),
            Some(&json!({"resourcePoolId": 7, "hostname": "from-answer", "userGroup": 2}))
        );
        assert_eq!(descriptor.get("customKey"), Some(&json!({"nested": true})));
        assert_eq!(descriptor.get("instance"), Some(&json!({"name": "web-01"})));
    }

    #[test]
    fn test_empty_lists_are_omitted() {
        let mut builder = DeploymentBuilder::new();
        builder.zone(1).plan(PlanRef {
            id: 4,
            code: Some("small".into()),
            name: "Small".into(),
        });
        let descriptor = builder.build(SelectionContext::new()).unwrap();
        assert!(descriptor.get("networkInterfaces").is_none());
        assert!(descriptor.get("evars").is_none());
        assert!(descriptor.volumes().is_empty());
        assert_eq!(
            descriptor.get("plan"),
            Some(&json!({"id": 4, "code": "small", "name": "Small"}))
        );
        assert_eq!(descriptor.body()["instance"]["plan"]["id"], json!(4));
    }
}
