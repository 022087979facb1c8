use crate::analysis::{FinalizedStats, ReportBuilder, ReportRow, StatsAggregator};
use crate::config::Config;
use crate::log::{LineParser, LogFileRef, LogLocator, LogReader};
use crate::{Error, Result};
use std::fmt;
use std::path::Path;

/// Stages of a single analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Located,
    Parsing,
    Aggregated,
    Reported,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Located => "located",
            PipelineState::Parsing => "parsing",
            PipelineState::Aggregated => "aggregated",
            PipelineState::Reported => "reported",
            PipelineState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub log_file: LogFileRef,
    pub stats: FinalizedStats,
    pub rows: Vec<ReportRow>,
}

/// Drives locate -> parse -> aggregate -> report for one log file.
///
/// A failed run stops in the state it had reached: `Idle` when no log was
/// found, `Parsing` when reading failed or too many lines were unparsable.
/// Partial aggregates of failed runs are dropped.
pub struct Pipeline {
    locator: LogLocator,
    parser: LineParser,
    builder: ReportBuilder,
    error_threshold: f64,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            locator: LogLocator::from_config(config)?,
            parser: LineParser,
            builder: ReportBuilder::from_config(config),
            error_threshold: config.error_threshold,
            state: PipelineState::Idle,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Locate the latest log and process it
    pub fn run(&mut self) -> Result<PipelineOutcome> {
        let log_file = self.locate()?;
        self.process(log_file)
    }

    /// Find the log to analyze; the run stays `Idle` if there is none
    pub fn locate(&mut self) -> Result<LogFileRef> {
        self.state = PipelineState::Idle;

        let log_file = self.locator.locate()?;
        self.advance(PipelineState::Located);
        Ok(log_file)
    }

    /// Parse, aggregate and rank a located log file.
    ///
    /// Only valid right after a successful [`Pipeline::locate`].
    pub fn process(&mut self, log_file: LogFileRef) -> Result<PipelineOutcome> {
        if self.state != PipelineState::Located {
            return Err(Error::InvalidState {
                action: "process a log",
                state: self.state.to_string(),
            });
        }

        self.advance(PipelineState::Parsing);
        let lines = LogReader::open(&log_file)?;
        let stats = aggregate_lines(lines, &self.parser, self.error_threshold, &log_file.path)?;
        self.advance(PipelineState::Aggregated);

        let rows = self.builder.build(&stats);
        self.advance(PipelineState::Reported);

        self.advance(PipelineState::Done);
        Ok(PipelineOutcome {
            log_file,
            stats,
            rows,
        })
    }

    fn advance(&mut self, next: PipelineState) {
        tracing::debug!("Pipeline state: {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Feed every line through the parser and aggregator, then apply the
/// parse-failure gate.
///
/// The whole stream is consumed before the failure ratio is judged. A read
/// error or a ratio above `error_threshold` discards the partial aggregate.
pub fn aggregate_lines<I>(
    lines: I,
    parser: &LineParser,
    error_threshold: f64,
    path: &Path,
) -> Result<FinalizedStats>
where
    I: IntoIterator<Item = Result<String>>,
{
    let mut aggregator = StatsAggregator::new();

    for line in lines {
        let line = line?;
        match parser.parse(&line) {
            Ok(record) => aggregator.ingest(record),
            Err(e) => {
                tracing::debug!("Skipping unparsable line ({}): {}", e, line);
                aggregator.record_failure();
            }
        }
    }

    let counts = aggregator.line_counts();
    let ratio = counts.failure_ratio();
    if ratio > error_threshold {
        tracing::error!(
            "{} of {} lines in {} failed to parse ({:.1}% > {:.1}%)",
            counts.failed_lines,
            counts.total_lines,
            path.display(),
            ratio * 100.0,
            error_threshold * 100.0
        );
        return Err(Error::ParseFailureRatioExceeded {
            path: path.to_path_buf(),
            failed: counts.failed_lines,
            total: counts.total_lines,
            threshold: error_threshold,
        });
    }

    if counts.failed_lines > 0 {
        tracing::warn!(
            "{} of {} lines in {} could not be parsed",
            counts.failed_lines,
            counts.total_lines,
            path.display()
        );
    }

    Ok(aggregator.finalize())
}
