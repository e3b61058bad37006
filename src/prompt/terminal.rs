//! Terminal prompts built on inquire

use super::render::{display_auto_selected, display_stage_header, prompt_render_config};
use crate::catalog::types::id_string;
use crate::error::{ProvisionError, Result};
use crate::resolver::{OptionKind, PromptRequest, Prompter, SelectOption};
use inquire::ui::RenderConfig;
use inquire::validator::{Validation, ValueRequiredValidator};
use inquire::{Confirm, InquireError, Select, Text};
use serde_json::{Number, Value};
use std::fmt;

fn prompt_error(e: InquireError) -> ProvisionError {
    match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => ProvisionError::Cancelled,
        other => ProvisionError::Prompt(other.to_string()),
    }
}

/// Select entry; `value` is `None` for the skip entry of optional fields
struct Choice {
    name: String,
    value: Option<Value>,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Whether a choice is the one a default points at, by value or by name
fn is_default(choice: &SelectOption, default: &Value) -> bool {
    match (id_string(&choice.value), id_string(default)) {
        (Some(value), Some(wanted)) => value == wanted || choice.name == wanted,
        _ => false,
    }
}

/// Parse a number answer, keeping integers integral
fn number_value(input: &str) -> Option<Value> {
    let input = input.trim();
    if let Ok(n) = input.parse::<i64>() {
        return Some(Value::from(n));
    }
    input
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.as_str(), "on" | "true" | "yes"),
        _ => false,
    }
}

pub struct TerminalPrompter {
    render_config: RenderConfig<'static>,
    stages: usize,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            render_config: prompt_render_config(),
            stages: 0,
        }
    }

    fn select(&self, request: &PromptRequest<'_>, message: &str) -> Result<Option<Value>> {
        let descriptor = request.descriptor;
        if request.choices.is_empty() {
            if descriptor.required {
                return Err(ProvisionError::not_found(
                    "Choices",
                    format!("field {}", descriptor.path()),
                ));
            }
            return Ok(None);
        }

        let mut items: Vec<Choice> = request
            .choices
            .iter()
            .map(|c| Choice {
                name: c.name.clone(),
                value: Some(c.value.clone()),
            })
            .collect();
        if !descriptor.required {
            items.push(Choice {
                name: "(skip)".to_string(),
                value: None,
            });
        }
        let cursor = request
            .default
            .and_then(|d| request.choices.iter().position(|c| is_default(c, d)))
            .unwrap_or(0);

        let mut prompt = Select::new(message, items)
            .with_starting_cursor(cursor)
            .with_render_config(self.render_config);
        if let Some(help) = descriptor.description.as_deref() {
            prompt = prompt.with_help_message(help);
        }
        let picked = prompt.prompt().map_err(prompt_error)?;
        Ok(picked.value)
    }

    fn number(&self, request: &PromptRequest<'_>, message: &str) -> Result<Option<Value>> {
        let descriptor = request.descriptor;
        let default = request.default.and_then(id_string).unwrap_or_default();
        let required = descriptor.required;
        let mut prompt = Text::new(message)
            .with_render_config(self.render_config)
            .with_validator(move |input: &str| {
                if input.trim().is_empty() {
                    return Ok(if required {
                        Validation::Invalid("A value is required".into())
                    } else {
                        Validation::Valid
                    });
                }
                Ok(match number_value(input) {
                    Some(_) => Validation::Valid,
                    None => Validation::Invalid("Enter a number".into()),
                })
            });
        if !default.is_empty() {
            prompt = prompt.with_default(&default);
        }
        if let Some(help) = descriptor.description.as_deref() {
            prompt = prompt.with_help_message(help);
        }
        let answer = prompt.prompt().map_err(prompt_error)?;
        Ok(number_value(&answer))
    }

    fn text(&self, request: &PromptRequest<'_>, message: &str) -> Result<Option<Value>> {
        let descriptor = request.descriptor;
        let default = request.default.and_then(id_string).unwrap_or_default();
        let mut prompt = Text::new(message).with_render_config(self.render_config);
        if descriptor.required {
            prompt = prompt.with_validator(ValueRequiredValidator::default());
        }
        if !default.is_empty() {
            prompt = prompt.with_default(&default);
        }
        if let Some(help) = descriptor.description.as_deref() {
            prompt = prompt.with_help_message(help);
        }
        let answer = prompt.prompt().map_err(prompt_error)?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| Value::String(answer.to_string())))
    }

    fn checkbox(&self, request: &PromptRequest<'_>, message: &str) -> Result<Option<Value>> {
        let checked = Confirm::new(message)
            .with_default(request.default.is_some_and(is_truthy))
            .with_render_config(self.render_config)
            .prompt()
            .map_err(prompt_error)?;
        Ok(Some(Value::String(if checked { "on" } else { "off" }.to_string())))
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, request: &PromptRequest<'_>) -> Result<Option<Value>> {
        let message = format!("{}:", request.descriptor.label());
        match request.descriptor.kind {
            OptionKind::Select => self.select(request, &message),
            OptionKind::Number => self.number(request, &message),
            OptionKind::Confirm => self.checkbox(request, &message),
            OptionKind::Text => self.text(request, &message),
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Confirm::new(message)
            .with_default(default)
            .with_render_config(self.render_config)
            .prompt()
            .map_err(prompt_error)
    }

    fn stage(&mut self, name: &str, description: &str) {
        self.stages += 1;
        display_stage_header(self.stages, name, description);
    }

    fn auto_selected(&mut self, label: &str, choice: &str) {
        display_auto_selected(label, choice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_values() {
        assert_eq!(number_value("40"), Some(json!(40)));
        assert_eq!(number_value(" 2.5 "), Some(json!(2.5)));
        assert_eq!(number_value("ten"), None);
    }

    #[test]
    fn test_default_matches_value_or_name() {
        let choice = SelectOption::new("Small", 4);
        assert!(is_default(&choice, &json!(4)));
        assert!(is_default(&choice, &json!("4")));
        assert!(is_default(&choice, &json!("Small")));
        assert!(!is_default(&choice, &json!(5)));
    }

    #[test]
    fn test_cancel_maps_to_cancelled() {
        assert!(matches!(
            prompt_error(InquireError::OperationCanceled),
            ProvisionError::Cancelled
        ));
        assert!(matches!(
            prompt_error(InquireError::OperationInterrupted),
            ProvisionError::Cancelled
        ));
    }

    #[test]
    fn test_truthy_defaults() {
        assert!(is_truthy(&json!("on")));
        assert!(is_truthy(&json!(true)));
        assert!(!is_truthy(&json!("off")));
    }
}
