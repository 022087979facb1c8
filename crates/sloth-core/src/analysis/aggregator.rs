use super::{AggregateTotals, FinalizedPath, FinalizedStats, LineCounts};
use crate::log::ParsedRecord;
use std::collections::HashMap;

/// Running statistics for a single request path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathStats {
    pub count: u64,
    pub time_sum: f64,
    pub time_max: f64,
    /// Every recorded time, kept for the exact median
    pub times: Vec<f64>,
}

impl PathStats {
    fn record(&mut self, time: f64) {
        self.count += 1;
        self.time_sum += time;
        self.time_max = self.time_max.max(time);
        self.times.push(time);
    }
}

/// Incremental per-path aggregation of parsed log records.
///
/// Records are fed in with [`ingest`](Self::ingest) and unparsable lines are
/// counted with [`record_failure`](Self::record_failure). Medians need the
/// full distribution, so averages and medians are only computed by
/// [`finalize`](Self::finalize).
#[derive(Debug, Default)]
pub struct StatsAggregator {
    paths: HashMap<String, PathStats>,
    totals: AggregateTotals,
    lines: LineCounts,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, record: ParsedRecord) {
        self.lines.total_lines += 1;
        self.totals.total_count += 1;
        self.totals.total_time += record.request_time;

        self.paths
            .entry(record.request_path)
            .or_default()
            .record(record.request_time);
    }

    /// Count a line that could not be parsed
    pub fn record_failure(&mut self) {
        self.lines.total_lines += 1;
        self.lines.failed_lines += 1;
    }

    pub fn totals(&self) -> AggregateTotals {
        self.totals
    }

    pub fn line_counts(&self) -> LineCounts {
        self.lines
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn path_stats(&self, path: &str) -> Option<&PathStats> {
        self.paths.get(path)
    }

    /// Compute per-path averages and medians.
    ///
    /// Leaves the aggregator untouched, so calling it twice yields identical
    /// results. Paths are returned sorted by url.
    pub fn finalize(&self) -> FinalizedStats {
        let mut paths: Vec<FinalizedPath> = self
            .paths
            .iter()
            .map(|(url, stats)| FinalizedPath {
                url: url.clone(),
                count: stats.count,
                time_sum: stats.time_sum,
                time_avg: if stats.count > 0 {
                    stats.time_sum / stats.count as f64
                } else {
                    0.0
                },
                time_max: stats.time_max,
                time_med: median(&stats.times),
            })
            .collect();
        paths.sort_by(|a, b| a.url.cmp(&b.url));

        tracing::info!(
            "Aggregated {} requests over {} paths ({:.3}s total, {} of {} lines unparsed)",
            self.totals.total_count,
            paths.len(),
            self.totals.total_time,
            self.lines.failed_lines,
            self.lines.total_lines
        );

        FinalizedStats {
            paths,
            totals: self.totals,
            lines: self.lines,
        }
    }
}

/// Median of the given values; the mean of the two central values for an
/// even count, zero when empty
pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, time: f64) -> ParsedRecord {
        ParsedRecord {
            request_path: path.to_string(),
            request_time: time,
        }
    }

    fn aggregate(records: &[(&str, f64)]) -> StatsAggregator {
        let mut aggregator = StatsAggregator::new();
        for (path, time) in records {
            aggregator.ingest(record(path, *time));
        }
        aggregator
    }

    #[test]
    fn test_median_odd() {
        assert_eq!(median(&[0.5, 0.1, 0.3]), 0.3);
    }

    #[test]
    fn test_median_even() {
        assert_eq!(median(&[0.4, 0.1, 0.3, 0.2]), 0.25);
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_ingest_tracks_path_stats() {
        let aggregator = aggregate(&[("/a", 0.1), ("/a", 0.3), ("/b", 0.2)]);

        let a = aggregator.path_stats("/a").unwrap();
        assert_eq!(a.count, 2);
        assert!((a.time_sum - 0.4).abs() < 1e-12);
        assert_eq!(a.time_max, 0.3);
        assert_eq!(a.times, vec![0.1, 0.3]);

        assert_eq!(aggregator.path_count(), 2);
        assert_eq!(aggregator.totals().total_count, 3);
    }

    #[test]
    fn test_finalize_computes_avg_and_median() {
        let stats = aggregate(&[("/a", 0.1), ("/a", 0.3), ("/b", 0.2)]).finalize();

        assert_eq!(stats.paths.len(), 2);
        let a = &stats.paths[0];
        assert_eq!(a.url, "/a");
        assert_eq!(a.count, 2);
        assert!((a.time_avg - 0.2).abs() < 1e-12);
        assert!((a.time_med - 0.2).abs() < 1e-12);
        assert_eq!(a.time_max, 0.3);

        let b = &stats.paths[1];
        assert_eq!(b.url, "/b");
        assert_eq!(b.time_med, 0.2);
    }

    #[test]
    fn test_sums_match_totals() {
        let records: Vec<(&str, f64)> = (0..100)
            .map(|i| (["/a", "/b", "/c", "/d"][i % 4], (i as f64) * 0.013))
            .collect();
        let stats = aggregate(&records).finalize();

        let count: u64 = stats.paths.iter().map(|p| p.count).sum();
        let time: f64 = stats.paths.iter().map(|p| p.time_sum).sum();
        assert_eq!(count, 100);
        assert_eq!(stats.totals.total_count, 100);
        assert!((time - stats.totals.total_time).abs() < 1e-9);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let aggregator = aggregate(&[("/x", 0.7), ("/y", 0.1), ("/x", 0.2), ("/x", 0.9)]);
        assert_eq!(aggregator.finalize(), aggregator.finalize());
    }

    #[test]
    fn test_failures_are_counted() {
        let mut aggregator = aggregate(&[("/a", 0.1), ("/a", 0.2)]);
        aggregator.record_failure();
        aggregator.record_failure();
        aggregator.record_failure();

        let lines = aggregator.line_counts();
        assert_eq!(lines.total_lines, 5);
        assert_eq!(lines.failed_lines, 3);
        assert!((lines.failure_ratio() - 0.6).abs() < 1e-12);
        assert_eq!(aggregator.totals().total_count, 2);
    }

    #[test]
    fn test_empty_aggregate() {
        let stats = StatsAggregator::new().finalize();
        assert!(stats.paths.is_empty());
        assert_eq!(stats.totals, AggregateTotals::default());
        assert_eq!(stats.lines.failure_ratio(), 0.0);
    }
}
