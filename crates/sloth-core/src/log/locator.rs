use crate::config::Config;
use crate::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// The access log selected for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileRef {
    pub path: PathBuf,
    pub date: NaiveDate,
    pub compressed: bool,
}

/// Finds the most recent access log in a directory.
///
/// Candidates are named `<prefix>-YYYYMMDD` or `<prefix>-YYYYMMDD.gz`.
/// Files with any other suffix, or whose date token is not a real calendar
/// date, are ignored. When a plain and a gzipped file carry the same date,
/// the plain one is selected.
pub struct LogLocator {
    dir: PathBuf,
    pattern: Regex,
}

impl LogLocator {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"^{}-(?P<date>\d{{8}})(?P<gz>\.gz)?$",
            regex::escape(prefix)
        ))
        .map_err(|e| Error::InvalidConfig(format!("Invalid log prefix {prefix:?}: {e}")))?;

        Ok(Self {
            dir: dir.into(),
            pattern,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.log_dir, &config.log_prefix)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Match a single file name against the naming pattern
    pub fn candidate(&self, file_name: &str) -> Option<LogFileRef> {
        let caps = self.pattern.captures(file_name)?;
        let token = &caps["date"];

        let date = match NaiveDate::parse_from_str(token, "%Y%m%d") {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!("Skipping {}: invalid date {}: {}", file_name, token, e);
                return None;
            }
        };

        Some(LogFileRef {
            path: self.dir.join(file_name),
            date,
            compressed: caps.name("gz").is_some(),
        })
    }

    /// Scan the directory and return the most recent log
    pub fn locate(&self) -> Result<LogFileRef> {
        tracing::debug!("Scanning for access logs in: {}", self.dir.display());

        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let mut latest: Option<LogFileRef> = None;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.dir, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(candidate) = self.candidate(file_name) else {
                continue;
            };
            if !candidate.path.is_file() {
                continue;
            }

            tracing::debug!("Candidate log: {}", candidate.path.display());
            latest = match latest {
                Some(current) if !is_newer(&candidate, &current) => Some(current),
                _ => Some(candidate),
            };
        }

        match latest {
            Some(log_file) => {
                tracing::info!(
                    "Latest log: {} (date {}, compressed: {})",
                    log_file.path.display(),
                    log_file.date,
                    log_file.compressed
                );
                Ok(log_file)
            }
            None => Err(Error::NoLogFound {
                dir: self.dir.clone(),
            }),
        }
    }
}

/// Later date wins; on equal dates an uncompressed file beats a gzipped one
fn is_newer(candidate: &LogFileRef, current: &LogFileRef) -> bool {
    (candidate.date, !candidate.compressed) > (current.date, !current.compressed)
}

impl LogFileRef {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
