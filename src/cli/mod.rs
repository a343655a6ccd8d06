//! Operations CLI for inspecting a resolver node's local state.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::cli::commands::{config::ConfigArgs, lease::LeaseArgs, logs::LogsArgs, sheltered::ShelteredArgs};

#[derive(Parser)]
#[command(name = "atlas-resolver")]
#[command(about = "Atlas resolver - challenge and transfer resolution engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show worker task leases
    Lease(LeaseArgs),

    /// Show recent worker logs
    Logs(LogsArgs),

    /// Show recently sheltered bundles
    Sheltered(ShelteredArgs),

    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Print a command failure and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1);
}
