use anyhow::{Context, Result};
use sloth_core::Config;
use sloth_core::pipeline::Pipeline;
use sloth_core::render::ReportRenderer;
use std::path::PathBuf;

/// What a `report` run ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    Written(PathBuf),
    AlreadyExists(PathBuf),
}

/// Analyze the latest log and write its HTML report.
///
/// A report that already exists for the log date is left untouched unless
/// `force` is set, so repeated runs are cheap.
pub fn generate_report(config: &Config, force: bool) -> Result<ReportStatus> {
    let renderer = ReportRenderer::from_config(config).context("Failed to load report template")?;
    let mut pipeline = Pipeline::new(config)?;

    let log_file = pipeline.locate()?;
    let report_path = ReportRenderer::report_path(&config.report_dir, log_file.date);
    if report_path.exists() && !force {
        return Ok(ReportStatus::AlreadyExists(report_path));
    }

    let outcome = pipeline
        .process(log_file)
        .context("Failed to analyze access log")?;

    let path = renderer
        .write(&outcome.rows, &config.report_dir, outcome.log_file.date)
        .context("Failed to write report")?;

    Ok(ReportStatus::Written(path))
}

pub fn execute(config: &Config, force: bool) -> Result<()> {
    tracing::info!("Looking for access logs in: {}", config.log_dir.display());

    match generate_report(config, force)? {
        ReportStatus::Written(path) => {
            tracing::info!("Report generated: {}", path.display());
            println!("{}", path.display());
        }
        ReportStatus::AlreadyExists(path) => {
            tracing::info!(
                "Report {} already exists, use --force to regenerate",
                path.display()
            );
        }
    }

    Ok(())
}
