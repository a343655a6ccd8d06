//! Sheltered bundle inspection.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::sqlite::{initialize_from_config, SqliteShelteredBundleRepository};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, ShelteredBundle};
use crate::domain::ports::ShelteredBundleRepository;

#[derive(Args, Debug)]
pub struct ShelteredArgs {
    /// Maximum number of bundles to display
    #[arg(short, long, default_value = "20")]
    pub limit: u32,
}

#[derive(Debug, serde::Serialize)]
pub struct ShelteredOutput {
    pub bundles: Vec<ShelteredBundle>,
    pub total: usize,
}

impl CommandOutput for ShelteredOutput {
    fn to_human(&self) -> String {
        if self.bundles.is_empty() {
            return "No sheltered bundles.".to_string();
        }

        let mut lines = vec![format!("{:<20} {}", "SHELTERED AT", "BUNDLE")];
        lines.push("-".repeat(90));
        for bundle in &self.bundles {
            lines.push(format!(
                "{:<20} {}",
                bundle.sheltered_at.format("%Y-%m-%d %H:%M:%S"),
                bundle.bundle_id
            ));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: ShelteredArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = initialize_from_config(&config.database)
        .await
        .context("Failed to open resolver database")?;
    let repo = SqliteShelteredBundleRepository::new(pool);

    let bundles = repo
        .recent(args.limit)
        .await
        .context("Failed to load sheltered bundles")?;

    let out = ShelteredOutput {
        total: bundles.len(),
        bundles,
    };
    output(&out, json_mode);
    Ok(())
}
