//! Atlas resolver CLI entry point.

use clap::Parser;

use atlas_resolver::cli::{commands, handle_error, Cli, Commands};
use atlas_resolver::infrastructure::config::ConfigLoader;
use atlas_resolver::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    // Keep stdout clean for command output.
    let log_config = LogConfig {
        enable_stdout: false,
        ..LogConfig::from(&config.logging)
    };
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err}");
            None
        }
    };

    let result = match cli.command {
        Commands::Lease(args) => commands::lease::execute(args, &config, cli.json).await,
        Commands::Logs(args) => commands::logs::execute(args, &config, cli.json).await,
        Commands::Sheltered(args) => commands::sheltered::execute(args, &config, cli.json).await,
        Commands::Config(args) => commands::config::execute(args, &config, cli.json),
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
