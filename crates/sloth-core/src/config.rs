use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_LOG_PREFIX: &str = "nginx-access-ui.log";

/// Runtime configuration, read from a JSON file and merged over defaults.
///
/// Keys use the SCREAMING_SNAKE_CASE spelling of the fields, e.g.
/// `{"REPORT_SIZE": 50, "LOG_DIR": "/var/log/nginx"}`. Omitted keys keep
/// their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct Config {
    /// Maximum number of rows in the report
    pub report_size: usize,
    /// Directory the HTML report is written to
    pub report_dir: PathBuf,
    /// Directory scanned for access logs
    pub log_dir: PathBuf,
    /// Access log filename prefix, before the `-YYYYMMDD` date token
    pub log_prefix: String,
    /// Maximum acceptable fraction of unparsed lines (0.0 - 1.0)
    pub error_threshold: f64,
    /// When set, the tool's own log is written here instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_files_dir: Option<PathBuf>,
    /// Custom HTML template; the built-in one is used otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_template: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_size: 1000,
            report_dir: PathBuf::from("./reports"),
            log_dir: PathBuf::from("./log"),
            log_prefix: DEFAULT_LOG_PREFIX.to_string(),
            error_threshold: 0.5,
            log_files_dir: None,
            report_template: None,
        }
    }
}

impl Config {
    /// Read a configuration file and merge it over the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading configuration from: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        content.parse()
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.error_threshold) {
            return Err(Error::InvalidConfig(format!(
                "ERROR_THRESHOLD must be between 0.0 and 1.0, got {}",
                self.error_threshold
            )));
        }
        if self.log_prefix.is_empty() {
            return Err(Error::InvalidConfig(
                "LOG_PREFIX must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = Error;

    /// Parse a configuration from a JSON string
    fn from_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = r#"{"REPORT_SIZE": 10, "LOG_DIR": "/var/log/nginx"}"#.parse::<Config>().unwrap();

        assert_eq!(config.report_size, 10);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/nginx"));
        assert_eq!(config.report_dir, PathBuf::from("./reports"));
        assert_eq!(config.log_prefix, DEFAULT_LOG_PREFIX);
        assert_eq!(config.error_threshold, 0.5);
        assert!(config.log_files_dir.is_none());
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!("{}".parse::<Config>().unwrap(), Config::default());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let result = r#"{"ERROR_THRESHOLD": 1.5}"#.parse::<Config>();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = r#"{"REPORT_SIZES": 10}"#.parse::<Config>();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!("{not json".parse::<Config>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file(Path::new("/nonexistent/sloth/config.json"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
