use anyhow::{Context, Result};
use clap::ValueEnum;
use sloth_core::Config;
use std::path::{Path, PathBuf};

pub mod commands;

/// Configuration file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Table,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
            OutputFormat::Table => "table",
        }
    }
}

/// Quote a field for `--format table` output when it would break the row
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Load the configuration file, merged over the defaults.
///
/// An explicitly requested file must exist. Without `--config` the default
/// `config.json` is used when present and the built-in defaults otherwise.
/// `log_dir` overrides `LOG_DIR` from the file.
pub fn load_config(path: Option<&Path>, log_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                Config::from_file(default_path).with_context(|| {
                    format!("Failed to load configuration {}", default_path.display())
                })?
            } else {
                Config::default()
            }
        }
    };

    if let Some(log_dir) = log_dir {
        config.log_dir = log_dir;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_csv_field_quotes_separators() {
        assert_eq!(csv_field("/api/v2/banner/1"), "/api/v2/banner/1");
        assert_eq!(csv_field("/list?ids=1,2"), "\"/list?ids=1,2\"");
        assert_eq!(csv_field("/q?name=\"x\""), "\"/q?name=\"\"x\"\"\"");
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let result = load_config(Some(Path::new("/nonexistent/sloth.json")), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_dir_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"LOG_DIR": "/from/file", "REPORT_SIZE": 7}"#).unwrap();

        let config = load_config(Some(&path), Some(PathBuf::from("/from/cli"))).unwrap();
        assert_eq!(config.log_dir, PathBuf::from("/from/cli"));
        assert_eq!(config.report_size, 7);
    }
}
