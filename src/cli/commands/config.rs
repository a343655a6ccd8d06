//! Effective configuration output.

use anyhow::Result;
use clap::Args;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct ConfigOutput {
    pub config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }
}

pub fn execute(_args: ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    output(
        &ConfigOutput {
            config: config.clone(),
        },
        json_mode,
    );
    Ok(())
}
