//! Explicit values supplied by the operator
//!
//! `-O key=value` assignments and an optional JSON payload form one nested
//! map. Field lookups go through `fieldContext.fieldName`; list presets
//! (`volumes`, `networkInterfaces`) seed per-index defaults.

use crate::error::ConfigError;
use crate::resolver::descriptor::OptionDescriptor;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides(Map<String, Value>);

impl Overrides {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parse `a.b.c=value` assignments into a nested map
    pub fn parse_assignments(assignments: &[String]) -> Result<Self, ConfigError> {
        let mut overrides = Self::default();
        for assignment in assignments {
            let (key, value) = assignment
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| ConfigError::InvalidOption(assignment.clone()))?;
            overrides.set_path(key.trim(), Value::String(value.to_string()));
        }
        Ok(overrides)
    }

    /// Layer these values over a base payload; existing values win
    pub fn layered_over(self, mut base: Map<String, Value>) -> Self {
        crate::assembler::descriptor::deep_merge(&mut base, self.0);
        Self(base)
    }

    pub fn set_path(&mut self, path: &str, value: Value) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let last = segments.pop().unwrap_or(path);
        let mut cursor = &mut self.0;
        for segment in segments {
            let entry = cursor
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(map) = entry else {
                return;
            };
            cursor = map;
        }
        cursor.insert(last.to_string(), value);
    }

    /// Value at a dotted path
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.0.get(first)?, |current, segment| {
            current.as_object()?.get(segment)
        })
    }

    /// Non-null explicit value for a field in an optional context
    pub fn explicit(&self, context: Option<&str>, field: &str) -> Option<&Value> {
        let value = match context {
            Some(ctx) if !ctx.is_empty() => self.get_path(&format!("{}.{}", ctx, field)),
            _ => self.0.get(field),
        };
        value.filter(|v| !v.is_null())
    }

    pub fn explicit_for(&self, descriptor: &OptionDescriptor) -> Option<&Value> {
        self.explicit(descriptor.field_context.as_deref(), &descriptor.field_name)
    }

    /// Whether a top-level key carries a truthy value
    pub fn has(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// The `index`th object of a preset list such as `volumes`
    pub fn preset(&self, list: &str, index: usize) -> Option<&Map<String, Value>> {
        self.0
            .get(list)?
            .as_array()?
            .get(index)?
            .as_object()
    }

    /// Scalar or `{id}` reference at a path, as an id string
    pub fn reference(&self, path: &str) -> Option<String> {
        self.get_path(path)
            .and_then(crate::catalog::types::id_string)
            .filter(|s| !s.is_empty())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
