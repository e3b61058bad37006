//! Handler for the `resize-volumes` command.

use super::{catalog_provider, emit_json, load_overrides};
use crate::assembler::{PayloadAssembler, ResizeRequest};
use crate::config::Config;
use crate::error::{ProvisionError, Result};
use crate::planner::Volume;
use crate::prompt::TerminalPrompter;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the resize-volumes command
#[derive(Debug, Clone, Default)]
pub struct ResizeOptions {
    /// Current volumes as a JSON list or `{"volumes": [...]}`
    pub volumes: PathBuf,
    pub group: String,
    pub cloud: String,
    pub layout: String,
    pub plan: String,
    pub options: Vec<String>,
    pub no_prompt: bool,
    pub output: Option<PathBuf>,
}

/// Current volumes of the instance being resized
pub fn read_volumes(path: &Path) -> Result<Vec<Volume>> {
    let content = fs::read_to_string(path)?;
    let list = match serde_json::from_str::<Value>(&content)? {
        Value::Object(mut map) => map.remove("volumes").unwrap_or(Value::Array(Vec::new())),
        other => other,
    };
    if !list.is_array() {
        return Err(ProvisionError::invalid("volumes", "expected a JSON list of volumes"));
    }
    Ok(serde_json::from_value(list)?)
}

pub fn handle_resize(options: ResizeOptions, config: &Config) -> Result<()> {
    let no_prompt = options.no_prompt || config.provisioning.no_prompt;
    let request = ResizeRequest {
        group: options.group.clone(),
        cloud: options.cloud.clone(),
        layout: options.layout.clone(),
        plan: options.plan.clone(),
        current: read_volumes(&options.volumes)?,
        overrides: load_overrides(&options.options, None)?,
    };
    let provider = catalog_provider(&config.remote)?;

    let mut prompter = TerminalPrompter::new();
    let volumes = PayloadAssembler::new(&provider, &mut prompter, no_prompt).resize(&request)?;
    let body = serde_json::to_string_pretty(&json!({ "volumes": volumes }))?;
    emit_json(&body, options.output.as_deref())
}
