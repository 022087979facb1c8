mod aggregator;
mod report;

pub use aggregator::{PathStats, StatsAggregator};
pub use report::{REPORT_PRECISION, ReportBuilder};

use serde::{Deserialize, Serialize};

/// Request totals over the whole log
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateTotals {
    pub total_count: u64,
    pub total_time: f64,
}

/// Line counters used for the parse-failure gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCounts {
    pub total_lines: u64,
    pub failed_lines: u64,
}

impl LineCounts {
    /// Fraction of lines that failed to parse; zero for an empty log
    pub fn failure_ratio(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.failed_lines as f64 / self.total_lines as f64
        }
    }
}

/// Final statistics for one request path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedPath {
    pub url: String,
    pub count: u64,
    pub time_sum: f64,
    pub time_avg: f64,
    pub time_max: f64,
    pub time_med: f64,
}

/// Everything the report builder needs once ingestion is complete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedStats {
    pub paths: Vec<FinalizedPath>,
    pub totals: AggregateTotals,
    pub lines: LineCounts,
}

/// One row of the slowest-endpoints report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub url: String,
    pub count: u64,
    pub count_perc: f64,
    pub time_sum: f64,
    pub time_perc: f64,
    pub time_avg: f64,
    pub time_max: f64,
    pub time_med: f64,
}
