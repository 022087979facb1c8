use crate::{OutputFormat, csv_field};
use anyhow::{Context, Result};
use sloth_core::Config;
use sloth_core::pipeline::{Pipeline, PipelineOutcome};

/// Run the pipeline, optionally overriding the number of rows
pub fn analyze_latest(config: &Config, limit: Option<usize>) -> Result<PipelineOutcome> {
    let mut config = config.clone();
    if let Some(limit) = limit {
        config.report_size = limit;
    }

    let mut pipeline = Pipeline::new(&config)?;
    let outcome = pipeline.run().context("Failed to analyze access log")?;
    Ok(outcome)
}

pub fn execute(config: &Config, limit: Option<usize>, format: OutputFormat) -> Result<()> {
    let outcome = analyze_latest(config, limit)?;
    tracing::debug!(
        "Printing {} rows as {}",
        outcome.rows.len(),
        format.as_str()
    );

    match format {
        OutputFormat::Json => output_json(&outcome)?,
        OutputFormat::Table => output_table(&outcome),
        OutputFormat::Pretty => output_pretty(&outcome),
    }

    Ok(())
}

fn output_pretty(outcome: &PipelineOutcome) {
    use console::style;

    let stats = &outcome.stats;

    println!("\n{}", style("Slowest Endpoints").bold().cyan());
    println!("{}", style("=================").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  Log File:         {}", outcome.log_file.path.display());
    println!("  Log Date:         {}", outcome.log_file.date);
    println!("  Requests:         {}", stats.totals.total_count);
    println!("  Total Time:       {:.3} s", stats.totals.total_time);
    println!("  Unique URLs:      {}", stats.paths.len());
    println!(
        "  Unparsed Lines:   {} of {} ({:.2}%)",
        stats.lines.failed_lines,
        stats.lines.total_lines,
        stats.lines.failure_ratio() * 100.0
    );

    if outcome.rows.is_empty() {
        println!("\n  No requests to report.");
    } else {
        println!("\n{}", style("By Total Time:").bold());
        for (i, row) in outcome.rows.iter().enumerate() {
            println!(
                "  {}. [{:.3} s, {:.3}%] {} - {} requests, avg {:.3} s, med {:.3} s, max {:.3} s",
                i + 1,
                row.time_sum,
                row.time_perc,
                style(&row.url).bold(),
                row.count,
                row.time_avg,
                row.time_med,
                row.time_max
            );
        }
    }

    println!();
}

fn output_json(outcome: &PipelineOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(&outcome.rows)?;
    println!("{}", json);
    Ok(())
}

fn output_table(outcome: &PipelineOutcome) {
    println!("url,count,count_perc,time_sum,time_perc,time_avg,time_max,time_med");
    for row in &outcome.rows {
        println!(
            "{},{},{},{},{},{},{},{}",
            csv_field(&row.url),
            row.count,
            row.count_perc,
            row.time_sum,
            row.time_perc,
            row.time_avg,
            row.time_max,
            row.time_med
        );
    }
}
