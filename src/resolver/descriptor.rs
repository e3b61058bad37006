//! Declared option fields
//!
//! Option descriptors are declared by catalog entities (instance types,
//! layouts, provision types) and built locally for every staged field.

use crate::catalog::types::nullable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a field is prompted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OptionKind {
    #[default]
    Text,
    Number,
    Select,
    Confirm,
}

impl From<String> for OptionKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "select" | "multiSelect" | "radio" | "typeahead" => Self::Select,
            "number" => Self::Number,
            "checkbox" => Self::Confirm,
            _ => Self::Text,
        }
    }
}

impl From<OptionKind> for String {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Text => "text",
            OptionKind::Number => "number",
            OptionKind::Select => "select",
            OptionKind::Confirm => "checkbox",
        }
        .to_string()
    }
}

/// A single choice for a select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl SelectOption {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A configurable field with type, requiredness and choice metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDescriptor {
    pub field_name: String,
    /// Namespace of the answer in the output tree (`config`, `rootVolume`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: OptionKind,
    #[serde(default, deserialize_with = "nullable")]
    pub required: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub select_options: Vec<SelectOption>,
    /// Remote source for dynamic choices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Pick the only choice without asking
    #[serde(default, deserialize_with = "nullable")]
    pub skip_single_option: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub display_order: i64,
}

impl OptionDescriptor {
    pub fn new(kind: OptionKind, field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            field_context: None,
            field_label: Some(label.into()),
            kind,
            required: false,
            select_options: Vec::new(),
            option_source: None,
            default_value: None,
            skip_single_option: false,
            description: None,
            code: None,
            display_order: 0,
        }
    }

    pub fn text(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(OptionKind::Text, field_name, label)
    }

    pub fn number(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(OptionKind::Number, field_name, label)
    }

    pub fn select(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(OptionKind::Select, field_name, label)
    }

    pub fn in_context(mut self, context: impl Into<String>) -> Self {
        self.field_context = Some(context.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_if(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn auto_pick(mut self) -> Self {
        self.skip_single_option = true;
        self
    }

    pub fn with_choices(mut self, choices: Vec<SelectOption>) -> Self {
        self.select_options = choices;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.option_source = Some(source.into());
        self
    }

    /// Null defaults are ignored
    pub fn with_default(mut self, default: Option<Value>) -> Self {
        self.default_value = default.filter(|v| !v.is_null());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn label(&self) -> &str {
        self.field_label.as_deref().unwrap_or(&self.field_name)
    }

    /// Dotted path of the answer, e.g. `dataVolume1.size`
    pub fn path(&self) -> String {
        match &self.field_context {
            Some(ctx) if !ctx.is_empty() => format!("{}.{}", ctx, self.field_name),
            _ => self.field_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_declaration_decodes() {
        let descriptor: OptionDescriptor = serde_json::from_value(json!({
            "fieldName": "securityId",
            "fieldContext": "config",
            "fieldLabel": "Security Group",
            "type": "select",
            "required": null,
            "optionSource": "securityGroups",
            "defaultValue": null,
            "displayOrder": 4
        }))
        .unwrap();
        assert_eq!(descriptor.kind, OptionKind::Select);
        assert!(!descriptor.required);
        assert_eq!(descriptor.default_value, None);
        assert_eq!(descriptor.path(), "config.securityId");
    }

    #[test]
    fn test_unknown_kinds_are_text() {
        assert_eq!(OptionKind::from("password".to_string()), OptionKind::Text);
        assert_eq!(OptionKind::from("checkbox".to_string()), OptionKind::Confirm);
        assert_eq!(String::from(OptionKind::Select), "select");
    }

    #[test]
    fn test_builder() {
        let d = OptionDescriptor::select("storageType", "Root Storage Type")
            .in_context("rootVolume")
            .required()
            .auto_pick()
            .with_default(Some(Value::Null));
        assert_eq!(d.path(), "rootVolume.storageType");
        assert!(d.required && d.skip_single_option);
        assert!(d.default_value.is_none());
        assert_eq!(d.label(), "Root Storage Type");
    }
}
