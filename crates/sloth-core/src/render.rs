use crate::analysis::ReportRow;
use crate::config::Config;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder in the template that receives the rows as a JSON array
pub const TABLE_PLACEHOLDER: &str = "$table_json";

const DEFAULT_TEMPLATE: &str = include_str!("../templates/report.html");

/// Embeds report rows into an HTML template
pub struct ReportRenderer {
    template: String,
}

impl ReportRenderer {
    pub fn new(template: String) -> Result<Self> {
        if !template.contains(TABLE_PLACEHOLDER) {
            return Err(Error::InvalidTemplate(format!(
                "template does not contain {TABLE_PLACEHOLDER}"
            )));
        }
        Ok(Self { template })
    }

    /// Use the configured template, falling back to the built-in one
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.report_template {
            Some(path) => {
                tracing::debug!("Loading report template from: {}", path.display());
                let template = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                Self::new(template)
            }
            None => Ok(Self::default()),
        }
    }

    /// Substitute the rows as JSON.
    ///
    /// `<`, `>` and `&` are written as `\u` escapes so a logged url cannot
    /// close the surrounding `<script>` element.
    pub fn render(&self, rows: &[ReportRow]) -> Result<String> {
        let json = serde_json::to_string(rows).map_err(Error::Serialize)?;
        Ok(self.template.replace(TABLE_PLACEHOLDER, &script_safe(&json)))
    }

    /// `<dir>/report-YYYY.MM.DD.html` for the given log date
    pub fn report_path(dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(format!("report-{}.html", date.format("%Y.%m.%d")))
    }

    /// Render and write the report, creating `dir` if needed
    pub fn write(&self, rows: &[ReportRow], dir: &Path, date: NaiveDate) -> Result<PathBuf> {
        let content = self.render(rows)?;

        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        let path = Self::report_path(dir, date);
        fs::write(&path, content).map_err(|e| Error::io(&path, e))?;

        tracing::info!(
            "Wrote report with {} rows to {}",
            rows.len(),
            path.display()
        );

        Ok(path)
    }
}

// Only string contents can hold these characters in serialized JSON
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
