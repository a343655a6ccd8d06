//! Worker task lease inspection.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::sqlite::{initialize_from_config, SqliteWorkerTaskRepository};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, WorkerTask};
use crate::domain::ports::WorkerTaskRepository;

#[derive(Args, Debug)]
pub struct LeaseArgs {
    /// Only show the lease for this work type
    #[arg(short, long)]
    pub work_type: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct LeaseOutput {
    pub id: String,
    pub work_type: String,
    pub status: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub task_timeout: String,
}

impl From<&WorkerTask> for LeaseOutput {
    fn from(task: &WorkerTask) -> Self {
        Self {
            id: task.id.to_string(),
            work_type: task.work_type.clone(),
            status: task.status.as_str().to_string(),
            start_time: task.start_time.to_rfc3339(),
            end_time: task.end_time.map(|t| t.to_rfc3339()),
            task_timeout: task.task_timeout.to_rfc3339(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct LeaseListOutput {
    pub leases: Vec<LeaseOutput>,
    pub total: usize,
}

impl CommandOutput for LeaseListOutput {
    fn to_human(&self) -> String {
        if self.leases.is_empty() {
            return "No worker leases found.".to_string();
        }

        let mut lines = vec![format!(
            "{:<28} {:<8} {:<26} {:<26}",
            "WORK TYPE", "STATUS", "STARTED", "EXPIRES"
        )];
        lines.push("-".repeat(90));

        for lease in &self.leases {
            lines.push(format!(
                "{:<28} {:<8} {:<26} {:<26}",
                lease.work_type, lease.status, lease.start_time, lease.task_timeout
            ));
        }

        lines.join("\n")
    }
}

pub async fn execute(args: LeaseArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = initialize_from_config(&config.database)
        .await
        .context("Failed to open resolver database")?;
    let repo = SqliteWorkerTaskRepository::new(pool);

    let leases = match args.work_type {
        Some(work_type) => repo
            .get_by_work_type(&work_type)
            .await
            .context("Failed to load lease")?
            .into_iter()
            .collect(),
        None => repo.list().await.context("Failed to list leases")?,
    };

    let out = LeaseListOutput {
        total: leases.len(),
        leases: leases.iter().map(LeaseOutput::from).collect(),
    };
    output(&out, json_mode);
    Ok(())
}
