use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sloth_cli::{OutputFormat, commands, load_config};
use sloth_core::Config;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "sloth")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Find the slowest endpoints in nginx access logs",
    long_about = "Sloth picks the most recent nginx access log (plain or gzipped), \
                  aggregates request times per URL and reports the endpoints that \
                  consume the most total time."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON configuration file [default: config.json if present]
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory with access logs (overrides LOG_DIR)
    #[arg(long, global = true, value_name = "DIR", env = "SLOTH_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the latest log and write the HTML report
    Report {
        /// Overwrite a report that already exists for the log date
        #[arg(long)]
        force: bool,
    },

    /// Analyze the latest log and print the slowest endpoints
    Top {
        /// Number of endpoints to show (overrides REPORT_SIZE)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show which log file would be analyzed
    Locate,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Completion { shell } = cli.command {
        return exit_code(commands::completion::execute(shell, &mut Cli::command()), true);
    }

    let config = load_config(cli.config.as_deref(), cli.log_dir.clone());
    let log_files_dir = config
        .as_ref()
        .ok()
        .and_then(|config| config.log_files_dir.clone());

    if let Err(e) = init_logging(cli.verbose, log_files_dir.as_deref()) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    let result = config.and_then(|config| {
        tracing::debug!("Configuration: {:?}", config);
        execute(cli.command, &config, cli.format)
    });
    exit_code(result, log_files_dir.is_some())
}

fn execute(command: Commands, config: &Config, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Report { force } => commands::report::execute(config, force),
        Commands::Top { limit } => commands::top::execute(config, limit, format),
        Commands::Locate => commands::locate::execute(config, format),
        Commands::Completion { .. } => Ok(()),
    }
}

/// Log a fatal error; `echo` also prints it when logs do not reach the terminal
fn exit_code(result: Result<()>, echo: bool) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            if echo {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, log_files_dir: Option<&Path>) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("sloth=debug,sloth_cli=debug,sloth_core=debug")
        } else {
            EnvFilter::new("sloth=info,sloth_cli=info,sloth_core=info")
        }
    });

    match log_files_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = dir.join(format!(
                "log_file_{}.txt",
                chrono::Local::now().format("%Y-%m-%d")
            ));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
