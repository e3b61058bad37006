//! # prov-ctl
//!
//! Resolves sparse operator input against a remote catalog into a complete
//! instance deployment descriptor.
//!
//! The pipeline walks group, cloud, instance type, version and layout, plan,
//! resource pool, volumes, network interfaces and the remaining declared
//! options. Every catalog query is scoped by the selections made before it,
//! and every value comes from an explicit override, a prompt, or a default.
//!
//! ## Example
//!
//! ```rust,no_run
//! use provision_cli::assembler::{PayloadAssembler, ProvisionRequest};
//! use provision_cli::catalog::HttpCatalogProvider;
//! use provision_cli::prompt::TerminalPrompter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = HttpCatalogProvider::with_url("https://catalog.example.com", None)?;
//! let mut prompter = TerminalPrompter::new();
//! let request = ProvisionRequest {
//!     instance_type: Some("mysql".to_string()),
//!     ..Default::default()
//! };
//! let descriptor = PayloadAssembler::new(&provider, &mut prompter, false).assemble(&request)?;
//! println!("{}", descriptor.to_pretty_json()?);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod planner;
pub mod prompt;
pub mod resolver;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use assembler::{DeploymentDescriptor, PayloadAssembler, ProvisionRequest, ResizeRequest};
pub use catalog::{CatalogCache, CatalogProvider};
pub use error::{ProvisionError, Result};
pub use resolver::{OptionResolver, Prompter};

use cli::Commands;
use config::Config;
use handlers::{ProvisionOptions, ResizeOptions};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Provision(args) => handlers::handle_provision(
            ProvisionOptions {
                group: args.group,
                cloud: args.cloud,
                instance_type: args.instance_type,
                name: args.name,
                description: args.description,
                environment: args.environment,
                layout: args.layout,
                plan: args.plan,
                options: args.options,
                payload: args.payload,
                no_prompt: args.no_prompt,
                name_required: args.name_required,
                output: args.output,
            },
            config,
        ),
        Commands::ResizeVolumes(args) => handlers::handle_resize(
            ResizeOptions {
                volumes: args.volumes,
                group: args.group,
                cloud: args.cloud,
                layout: args.layout,
                plan: args.plan,
                options: args.options,
                no_prompt: args.no_prompt,
                output: args.output,
            },
            config,
        ),
    }
}
