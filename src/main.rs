use clap::Parser;
use colored::Colorize;
use provision_cli::cli::Cli;
use provision_cli::{ProvisionError, config, run_command};
use std::process;

fn main() {
    if let Err(e) = run() {
        match e {
            ProvisionError::Cancelled => eprintln!("{}", e.to_string().yellow()),
            e => eprintln!("{} {}", "Error:".red().bold(), e.to_string().red()),
        }
        process::exit(1);
    }
}

fn run() -> provision_cli::Result<()> {
    let cli = Cli::parse();
    cli.init_logging();

    let config = config::load_config(cli.config.as_deref())?;
    run_command(cli.command, &config)
}
