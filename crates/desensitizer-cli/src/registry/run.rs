use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use desensitizer_config::DesensitizeConfig;
use desensitizer_core::RedactedConnection;
use desensitizer_mask::RunReport;

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub config_path: PathBuf,
    pub output_dir: PathBuf,
    pub connection: RedactedConnection,
}

/// JSON written next to the desensitized tables. Never holds a password.
#[derive(Debug, Serialize)]
struct RunConfig<'a> {
    run_id: &'a str,
    started_at: String,
    config_path: String,
    connection: &'a RedactedConnection,
    config: &'a DesensitizeConfig,
    git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub output_dir: PathBuf,
    pub logs_path: PathBuf,
    pub config_path: PathBuf,
    pub report_path: PathBuf,
}

/// Create the output directory and an empty log file.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    create_dir_all(&ctx.output_dir)?;

    let paths = RunPaths {
        output_dir: ctx.output_dir.clone(),
        logs_path: ctx.output_dir.join("logs.ndjson"),
        config_path: ctx.output_dir.join("run_config.json"),
        report_path: ctx.output_dir.join("desensitize_report.json"),
    };

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

pub fn write_run_config(
    paths: &RunPaths,
    ctx: &RunContext,
    config: &DesensitizeConfig,
) -> RegistryResult<()> {
    let run_config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        config_path: ctx.config_path.display().to_string(),
        connection: &ctx.connection,
        config,
        git: collect_git_info(),
    };
    write_json(&paths.config_path, &run_config)
}

pub fn write_report(paths: &RunPaths, report: &RunReport) -> RegistryResult<()> {
    write_json(&paths.report_path, report)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}
