use crate::{OutputFormat, csv_field};
use anyhow::Result;
use sloth_core::Config;
use sloth_core::log::LogLocator;

pub fn execute(config: &Config, format: OutputFormat) -> Result<()> {
    let log_file = LogLocator::from_config(config)?.locate()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": log_file.path.display().to_string(),
                "date": log_file.date.to_string(),
                "compressed": log_file.compressed,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            println!("path,date,compressed");
            println!(
                "{},{},{}",
                csv_field(&log_file.path.display().to_string()),
                log_file.date,
                log_file.compressed
            );
        }
        OutputFormat::Pretty => {
            use console::style;

            println!("{}", style("Latest Access Log").bold().cyan());
            println!("  File:        {}", log_file.path.display());
            println!("  Date:        {}", log_file.date);
            println!("  Compressed:  {}", if log_file.compressed { "yes" } else { "no" });
        }
    }

    Ok(())
}
