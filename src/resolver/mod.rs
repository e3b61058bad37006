//! Single-field resolution
//!
//! [`OptionResolver`] turns one declared field into a value: an explicit
//! override wins, then a lone choice when auto-pick is allowed, then the
//! computed default (offered as the prompt's suggestion), then an
//! interactive prompt. Without prompting, a required field that cannot be
//! inferred fails with `ValidationRequired`.

pub mod descriptor;
pub mod lookup;
pub mod overrides;

pub use descriptor::{OptionDescriptor, OptionKind, SelectOption};
pub use overrides::Overrides;

use crate::catalog::{CatalogCache, Category};
use crate::context::SelectionContext;
use crate::error::{ProvisionError, Result};
use log::{debug, info};
use serde_json::{Map, Value};

/// What the prompt UI is asked to resolve
#[derive(Debug)]
pub struct PromptRequest<'a> {
    pub descriptor: &'a OptionDescriptor,
    pub choices: &'a [SelectOption],
    pub default: Option<&'a Value>,
}

/// The interactive prompt UI
pub trait Prompter {
    /// Ask for one field; `None` means the operator left it empty
    fn ask(&mut self, request: &PromptRequest<'_>) -> Result<Option<Value>>;

    /// Yes/no question used by the repeat loops
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Called when the pipeline moves to a new stage
    fn stage(&mut self, _name: &str, _description: &str) {}

    /// Called when a field's only choice was taken without asking
    fn auto_selected(&mut self, _label: &str, _choice: &str) {}
}

pub struct OptionResolver<'p> {
    prompter: &'p mut dyn Prompter,
    no_prompt: bool,
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl<'p> OptionResolver<'p> {
    pub fn new(prompter: &'p mut dyn Prompter, no_prompt: bool) -> Self {
        Self {
            prompter,
            no_prompt,
        }
    }

    pub fn is_interactive(&self) -> bool {
        !self.no_prompt
    }

    /// Resolve one field against an already known choice list
    pub fn resolve(
        &mut self,
        descriptor: &OptionDescriptor,
        explicit: Option<&Value>,
        choices: &[SelectOption],
    ) -> Result<Option<Value>> {
        if let Some(value) = explicit.filter(|v| !v.is_null()) {
            return Ok(Some(value.clone()));
        }

        let is_select = descriptor.kind == OptionKind::Select;
        if is_select && descriptor.skip_single_option && choices.len() == 1 {
            info!("{} auto-selected: {}", descriptor.label(), choices[0].name);
            if !self.no_prompt {
                self.prompter.auto_selected(descriptor.label(), &choices[0].name);
            }
            return Ok(Some(choices[0].value.clone()));
        }

        let default = descriptor.default_value.as_ref().filter(|v| !is_blank(v));

        if self.no_prompt {
            if let Some(value) = default {
                return Ok(Some(value.clone()));
            }
            if is_select && descriptor.required && choices.len() == 1 {
                return Ok(Some(choices[0].value.clone()));
            }
            if descriptor.required {
                return Err(ProvisionError::required(descriptor.path()));
            }
            return Ok(None);
        }

        let answer = self.prompter.ask(&PromptRequest {
            descriptor,
            choices,
            default,
        })?;
        match answer.filter(|v| !is_blank(v)) {
            Some(value) => Ok(Some(value)),
            None if descriptor.required => Err(ProvisionError::required(descriptor.path())),
            None => Ok(None),
        }
    }

    /// Resolve a required field, treating an empty answer as an error
    pub fn resolve_required(
        &mut self,
        descriptor: &OptionDescriptor,
        explicit: Option<&Value>,
        choices: &[SelectOption],
    ) -> Result<Value> {
        self.resolve(descriptor, explicit, choices)?
            .ok_or_else(|| ProvisionError::required(descriptor.path()))
    }

    /// Choices for a descriptor: its static list, or its dynamic source
    pub fn choices_for(
        descriptor: &OptionDescriptor,
        cache: &mut CatalogCache<'_>,
        ctx: &SelectionContext,
    ) -> Result<Vec<SelectOption>> {
        match &descriptor.option_source {
            Some(source) if descriptor.select_options.is_empty() => Ok(cache
                .get(&Category::from_source(source), ctx, false)?
                .iter()
                .map(|o| o.to_select_option())
                .collect()),
            _ => Ok(descriptor.select_options.clone()),
        }
    }

    /// Resolve a field using explicit values from the overrides map
    ///
    /// Dynamic choices are only fetched when the value is not explicit.
    pub fn resolve_field(
        &mut self,
        descriptor: &OptionDescriptor,
        overrides: &Overrides,
        cache: &mut CatalogCache<'_>,
        ctx: &SelectionContext,
    ) -> Result<Option<Value>> {
        let explicit = overrides.explicit_for(descriptor);
        if explicit.is_some() {
            return self.resolve(descriptor, explicit, &[]);
        }
        let choices = Self::choices_for(descriptor, cache, ctx)?;
        self.resolve(descriptor, None, &choices)
    }

    /// Resolve a list of descriptors into a tree keyed by context and field
    pub fn resolve_all(
        &mut self,
        descriptors: &[OptionDescriptor],
        overrides: &Overrides,
        cache: &mut CatalogCache<'_>,
        ctx: &SelectionContext,
    ) -> Result<Map<String, Value>> {
        let mut answers = Overrides::default();
        for descriptor in descriptors {
            if let Some(value) = self.resolve_field(descriptor, overrides, cache, ctx)? {
                debug!("Resolved {}", descriptor.path());
                answers.set_path(&descriptor.path(), value);
            }
        }
        Ok(answers.as_map().clone())
    }

    /// Ask a yes/no question; never asked without prompting
    pub fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        if self.no_prompt {
            return Ok(false);
        }
        self.prompter.confirm(message, default)
    }

    pub fn stage(&mut self, name: &str, description: &str) {
        if !self.no_prompt {
            self.prompter.stage(name, description);
        }
    }
}
