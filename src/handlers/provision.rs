//! Handler for the `provision` command.
//!
//! Resolves the operator's sparse input against the remote catalog and
//! prints the resulting deployment descriptor as JSON.

use super::{catalog_provider, emit_json, load_overrides};
use crate::assembler::{PayloadAssembler, ProvisionRequest};
use crate::config::Config;
use crate::error::Result;
use crate::prompt::TerminalPrompter;
use colored::Colorize;
use log::info;
use std::path::PathBuf;

/// Configuration for the provision command
#[derive(Debug, Clone, Default)]
pub struct ProvisionOptions {
    pub group: Option<String>,
    pub cloud: Option<String>,
    /// Instance type id, name or code
    pub instance_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub environment: Option<String>,
    pub layout: Option<String>,
    pub plan: Option<String>,
    /// `key=value` assignments with dotted keys
    pub options: Vec<String>,
    /// JSON payload the assignments are layered over
    pub payload: Option<PathBuf>,
    pub no_prompt: bool,
    pub name_required: bool,
    pub output: Option<PathBuf>,
}

impl ProvisionOptions {
    fn request(&self, config: &Config) -> Result<ProvisionRequest> {
        Ok(ProvisionRequest {
            group: self.group.clone(),
            cloud: self.cloud.clone(),
            instance_type: self.instance_type.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            environment: self.environment.clone(),
            layout: self.layout.clone(),
            plan: self.plan.clone(),
            name_required: self.name_required,
            default_group: config.provisioning.default_group.clone(),
            default_cloud: config.provisioning.default_cloud.clone(),
            overrides: load_overrides(&self.options, self.payload.as_deref())?,
        })
    }
}

pub fn handle_provision(options: ProvisionOptions, config: &Config) -> Result<()> {
    let no_prompt = options.no_prompt || config.provisioning.no_prompt;
    let request = options.request(config)?;
    let provider = catalog_provider(&config.remote)?;
    info!("Resolving deployment against {}", provider.api_url());

    let mut prompter = TerminalPrompter::new();
    let descriptor = PayloadAssembler::new(&provider, &mut prompter, no_prompt).assemble(&request)?;

    if !no_prompt {
        eprintln!("\n{}", "✅ Deployment descriptor resolved".green().bold());
    }
    emit_json(&descriptor.to_pretty_json()?, options.output.as_deref())
}
