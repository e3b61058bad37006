//! Environment variable and metadata tag collection

use super::continuation;
use crate::catalog::types::id_string;
use crate::error::Result;
use crate::resolver::{OptionDescriptor, OptionResolver, Overrides};
use serde::{Deserialize, Serialize};

/// A `{id, name, value}` entry; `id` is always null for new entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Option<i64>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Evar,
    Metadata,
}

impl EntryKind {
    /// Field context of the entry at `index` (`evar0`, `metadata3`, ...)
    pub fn context(self, index: usize) -> String {
        match self {
            Self::Evar => format!("evar{}", index),
            Self::Metadata => format!("metadata{}", index),
        }
    }

    fn label(self, index: usize) -> String {
        let base = match self {
            Self::Evar => "ENV",
            Self::Metadata => "Metadata Tag",
        };
        if index == 0 {
            base.to_string()
        } else {
            format!("{} [{}]", base, index + 1)
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::Evar => "Environment Variable",
            Self::Metadata => "Metadata Tag",
        }
    }

    fn first_question(self) -> &'static str {
        match self {
            Self::Evar => "Add an environment variable?",
            Self::Metadata => "Add a metadata tag?",
        }
    }

    fn next_question(self) -> &'static str {
        match self {
            Self::Evar => "Add another environment variable?",
            Self::Metadata => "Add another metadata tag?",
        }
    }
}

fn entry(
    kind: EntryKind,
    index: usize,
    overrides: &Overrides,
    resolver: &mut OptionResolver<'_>,
) -> Result<Entry> {
    let context = kind.context(index);
    let label = kind.label(index);
    let mut field = |name: &str, suffix: &str| -> Result<String> {
        let descriptor = OptionDescriptor::text(name, format!("{} {}", label, suffix))
            .in_context(context.clone())
            .required()
            .with_description(format!("{} {}.", kind.noun(), suffix));
        let value = resolver.resolve_required(&descriptor, overrides.explicit_for(&descriptor), &[])?;
        Ok(id_string(&value).unwrap_or_default())
    };
    let name = field("name", "Name")?;
    let value = field("value", "Value")?;
    Ok(Entry {
        id: None,
        name,
        value,
    })
}

/// Collect entries until declined; `evarN`/`metadataN` values imply another
pub fn collect_entries(
    kind: EntryKind,
    overrides: &Overrides,
    resolver: &mut OptionResolver<'_>,
) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut more = continuation::next(resolver, overrides.has(&kind.context(0)), false, kind.first_question())?;
    while more {
        entries.push(entry(kind, entries.len(), overrides, resolver)?);
        more = continuation::next(
            resolver,
            overrides.has(&kind.context(entries.len())),
            false,
            kind.next_question(),
        )?;
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use crate::testing::ScriptedPrompter;
    use serde_json::json;

    #[test]
    fn test_explicit_entries_are_collected_in_order() {
        let overrides = Overrides::new(
            json!({
                "evar0": {"name": "PORT", "value": "8080"},
                "evar1": {"name": "MODE", "value": "prod"},
                "evar3": {"name": "SKIPPED", "value": "x"}
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        );
        let mut prompter = ScriptedPrompter::new();
        let mut resolver = OptionResolver::new(&mut prompter, true);
        let evars = collect_entries(EntryKind::Evar, &overrides, &mut resolver).unwrap();
        let names: Vec<&str> = evars.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["PORT", "MODE"]);
        assert_eq!(
            serde_json::to_value(&evars[0]).unwrap(),
            json!({"id": null, "name": "PORT", "value": "8080"})
        );
    }

    #[test]
    fn test_prompted_metadata() {
        let none = Overrides::default();
        let mut prompter = ScriptedPrompter::new()
            .confirming(true)
            .answer(json!("owner"))
            .answer(json!("ops"))
            .confirming(false);
        let mut resolver = OptionResolver::new(&mut prompter, false);
        let tags = collect_entries(EntryKind::Metadata, &none, &mut resolver).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].value, "ops");
        drop(resolver);
        assert_eq!(prompter.asked(), vec!["metadata0.name", "metadata0.value"]);
    }

    #[test]
    fn test_partial_entry_without_prompting_fails() {
        let overrides = Overrides::new(
            json!({"metadata0": {"name": "owner"}}).as_object().cloned().unwrap_or_default(),
        );
        let mut prompter = ScriptedPrompter::new();
        let mut resolver = OptionResolver::new(&mut prompter, true);
        let err = collect_entries(EntryKind::Metadata, &overrides, &mut resolver).unwrap_err();
        assert!(matches!(err, ProvisionError::ValidationRequired { ref field } if field == "metadata0.value"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(EntryKind::Evar.label(0), "ENV");
        assert_eq!(EntryKind::Metadata.label(2), "Metadata Tag [3]");
    }
}
