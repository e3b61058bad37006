use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prov-ctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve instance deployments against a remote catalog")]
#[command(
    long_about = "Walks group, cloud, instance type, layout and plan selections against the remote catalog, plans volumes and network interfaces, and prints the complete deployment descriptor. Anything not given on the command line is prompted for, or taken from defaults with --no-prompt."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the deployment descriptor for a new instance
    Provision(ProvisionArgs),

    /// Re-plan an existing instance's volumes for a service plan
    ResizeVolumes(ResizeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProvisionArgs {
    /// Group name or id
    #[arg(short, long)]
    pub group: Option<String>,

    /// Cloud name or id
    #[arg(long)]
    pub cloud: Option<String>,

    /// Instance type name, code or id
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub instance_type: Option<String>,

    /// Instance name
    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Environment code, e.g. production
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Layout name, code or id
    #[arg(short, long)]
    pub layout: Option<String>,

    /// Service plan name, code or id
    #[arg(short, long)]
    pub plan: Option<String>,

    /// Explicit option values as dotted key=value pairs (rootVolume.size=40)
    #[arg(short = 'O', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// JSON payload the -O values are layered over
    #[arg(long, value_name = "FILE")]
    pub payload: Option<PathBuf>,

    /// Never prompt; fail when a required value is missing
    #[arg(long)]
    pub no_prompt: bool,

    /// Require an instance name
    #[arg(long)]
    pub name_required: bool,

    /// Write the descriptor to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ResizeArgs {
    /// Current volumes as JSON
    #[arg(long, value_name = "FILE")]
    pub volumes: PathBuf,

    #[arg(short, long)]
    pub group: String,

    #[arg(long)]
    pub cloud: String,

    /// Layout id the plans are listed for
    #[arg(short, long)]
    pub layout: String,

    /// Target service plan name, code or id
    #[arg(short, long)]
    pub plan: String,

    /// Explicit option values as dotted key=value pairs (dataVolume1.action=delete)
    #[arg(short = 'O', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Never prompt; existing data volumes are kept
    #[arg(long)]
    pub no_prompt: bool,

    /// Write the volume list to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
