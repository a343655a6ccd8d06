//! Persisted worker log inspection.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::sqlite::{initialize_from_config, SqliteWorkerLogRepository};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{Config, WorkerLog};
use crate::domain::ports::WorkerLogRepository;

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Maximum number of entries to display
    #[arg(short, long, default_value = "20")]
    pub limit: u32,
}

#[derive(Debug, serde::Serialize)]
pub struct LogsOutput {
    pub logs: Vec<WorkerLog>,
    pub total: usize,
}

impl CommandOutput for LogsOutput {
    fn to_human(&self) -> String {
        if self.logs.is_empty() {
            return "No worker logs found.".to_string();
        }

        let mut lines = Vec::with_capacity(self.logs.len());
        for log in &self.logs {
            let mut line = format!(
                "{} {:<5} {:<26} {}",
                log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                log.level.as_str().to_uppercase(),
                truncate(&log.worker, 26),
                log.message
            );
            if let Some(ref error) = log.error {
                line.push_str(&format!(": {}", truncate(error, 80)));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}

pub async fn execute(args: LogsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = initialize_from_config(&config.database)
        .await
        .context("Failed to open resolver database")?;
    let repo = SqliteWorkerLogRepository::new(pool);

    let logs = repo
        .recent(args.limit)
        .await
        .context("Failed to load worker logs")?;

    let out = LogsOutput {
        total: logs.len(),
        logs,
    };
    output(&out, json_mode);
    Ok(())
}
