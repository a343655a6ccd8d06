// Installs the global subscriber, so this binary holds a single test.

use atlas_resolver::infrastructure::logging::{LogConfig, LogFormat, LoggerImpl, RotationPolicy};
use std::fs;
use tempfile::TempDir;
use tracing::{info, instrument, warn};

#[test]
fn test_file_logging_writes_json_lines() {
    let temp_dir = TempDir::new().unwrap();

    let config = LogConfig {
        level: "info".to_string(),
        format: LogFormat::Json,
        log_dir: Some(temp_dir.path().to_path_buf()),
        enable_stdout: false,
        rotation: RotationPolicy::Never,
    };

    let logger = LoggerImpl::init(&config).unwrap();
    assert!(logger.has_file_output());

    info!(work_type = "AtlasChallengeResolution", "resolution tick finished");
    tracing::debug!("filtered out below info");

    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(resolve("c1"));

    // Dropping the guard flushes the non-blocking writer.
    drop(logger);

    let contents = fs::read_to_string(temp_dir.path().join("atlas.log")).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).expect("every line is JSON"))
        .collect();

    assert!(lines
        .iter()
        .any(|l| l["fields"]["message"] == "resolution tick finished"
            && l["fields"]["work_type"] == "AtlasChallengeResolution"));
    assert!(!contents.contains("filtered out below info"));

    let span_line = lines
        .iter()
        .find(|l| l["fields"]["message"] == "download failed")
        .expect("instrumented warning");
    assert_eq!(span_line["level"], "WARN");
    assert_eq!(span_line["span"]["id"], "c1");
}

#[instrument]
async fn resolve(id: &str) {
    warn!("download failed");
}
