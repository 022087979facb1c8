use super::{FinalizedStats, ReportRow};
use crate::config::Config;
use std::cmp::Ordering;

/// Decimal places every float field of a report row is rounded to
pub const REPORT_PRECISION: i32 = 3;

/// Ranks paths by total request time and keeps the top `max_rows`
pub struct ReportBuilder {
    max_rows: usize,
}

impl ReportBuilder {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.report_size)
    }

    /// Build report rows, slowest paths first.
    ///
    /// Rows are ordered by `time_sum` descending with ties broken by url
    /// ascending. All float fields are rounded to [`REPORT_PRECISION`]
    /// decimal places before ranking, so rows that print the same `time_sum`
    /// always appear in url order. Percentages are zero when the
    /// corresponding total is zero.
    pub fn build(&self, stats: &FinalizedStats) -> Vec<ReportRow> {
        tracing::debug!(
            "Building report from {} paths (max {} rows)",
            stats.paths.len(),
            self.max_rows
        );

        let total_count = stats.totals.total_count;
        let total_time = stats.totals.total_time;

        let mut rows: Vec<ReportRow> = stats
            .paths
            .iter()
            .map(|path| ReportRow {
                url: path.url.clone(),
                count: path.count,
                count_perc: round(percentage(path.count as f64, total_count as f64)),
                time_sum: round(path.time_sum),
                time_perc: round(percentage(path.time_sum, total_time)),
                time_avg: round(path.time_avg),
                time_max: round(path.time_max),
                time_med: round(path.time_med),
            })
            .collect();

        rows.sort_by(rank);
        rows.truncate(self.max_rows);
        rows
    }
}

fn rank(a: &ReportRow, b: &ReportRow) -> Ordering {
    b.time_sum
        .total_cmp(&a.time_sum)
        .then_with(|| a.url.cmp(&b.url))
}

fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 { 100.0 * part / total } else { 0.0 }
}

/// `(value * 10^REPORT_PRECISION).round() / 10^REPORT_PRECISION` on `f64`.
///
/// Halves are resolved on the stored binary value, so `1.0005` becomes `1.0`.
fn round(value: f64) -> f64 {
    let factor = 10f64.powi(REPORT_PRECISION);
    (value * factor).round() / factor
}
