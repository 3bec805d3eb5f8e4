// torent - Toronto highrise bylaw and fire-code history lookup

mod exit_codes;
mod render;
mod shell;
mod util;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};
use torent_config::{ConfigError, Settings};
use torent_engine::{QueryOptions, Report, TimelineView};
use torent_io::catalog::{self, Catalog};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "torent")]
#[command(about = "Look up bylaw investigations and fire-code inspections for a Toronto address")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings file (default: <config dir>/torent/settings.toml when present)
    #[arg(long, global = true, env = "TORENT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the bylaw/ and fire/ datasets
    #[arg(long, global = true, env = "TORENT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Minimum address similarity score (0-100)
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: Option<u8>,

    /// Log more detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one address and print its history
    #[command(after_help = "\
Examples:
  torent search 123 Main St
  torent search '40 Bay St' --view monthly
  torent search '40 Bay St' --json
  torent search '40 Bay St' --charts out/")]
    Search {
        /// Address to look up (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        address: Vec<String>,

        /// Timeline granularity: yearly or monthly
        #[arg(long)]
        view: Option<TimelineView>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Write each chart as a Vega-Lite file into this directory
        #[arg(long, value_name = "DIR")]
        charts: Option<PathBuf>,
    },

    /// Interactive session: one address per line (default command)
    Shell {
        /// Initial timeline granularity: yearly or monthly
        #[arg(long)]
        view: Option<TimelineView>,
    },

    /// Show which datasets loaded and how many rows each has
    Datasets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  torent-engine ", env!("CARGO_PKG_VERSION"),
    )
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Read { .. } => Some("check the --config path".to_string()),
            ConfigError::Parse { .. } => {
                Some("settings are TOML: data_dir, threshold, max_candidates, view, [paths]".to_string())
            }
            ConfigError::Invalid { .. } => None,
        };
        Self { code: EXIT_USAGE, message: err.to_string(), hint }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::runtime(err.to_string())
    }
}

fn init_tracing(verbose: u8) {
    let default = if verbose > 0 { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests, embedding) is not an error worth reporting
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Settings file, then command-line overrides.
fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = Settings::load(cli.config.as_deref()).map_err(CliError::config)?;

    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(threshold) = cli.threshold {
        settings.threshold = threshold;
    }
    settings.data_dir = expand_home(&settings.data_dir);
    settings.validate().map_err(CliError::config)?;
    Ok(settings)
}

fn expand_home(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}

/// The shared catalog, or an error when no lookup can run at all.
fn open_catalog(settings: &Settings) -> Result<Arc<Catalog>, CliError> {
    let catalog = catalog::shared(&settings.data_paths());
    if catalog.bylaw_sources().is_err() && catalog.fire_inspections().is_err() {
        return Err(CliError::runtime(format!(
            "no searchable datasets under {}",
            settings.data_dir.display()
        ))
        .with_hint("pass --data-dir or set data_dir in settings.toml; `torent datasets` lists what loaded"));
    }
    Ok(catalog)
}

fn query_options(settings: &Settings, view: Option<TimelineView>) -> QueryOptions {
    QueryOptions {
        matching: settings.match_options(),
        view: view.unwrap_or(settings.view),
    }
}

fn write_charts(dir: &Path, report: &Report) -> Result<usize, CliError> {
    fs::create_dir_all(dir)
        .map_err(|e| CliError::runtime(format!("cannot create {}: {e}", dir.display())))?;

    let charts = report.charts();
    for (slug, spec) in &charts {
        let path = dir.join(format!("{slug}.vl.json"));
        let json = serde_json::to_string_pretty(&spec.to_vega_lite())
            .map_err(|e| CliError::runtime(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
    }
    Ok(charts.len())
}

fn cmd_search(
    settings: &Settings,
    address: Vec<String>,
    view: Option<TimelineView>,
    json: bool,
    charts: Option<PathBuf>,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings)?;
    let query = address.join(" ");

    // Blank query: nothing is resolved and nothing renders
    let Some(report) = catalog.search(&query, &query_options(settings, view)) else {
        return Ok(());
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let text = serde_json::to_string_pretty(&report).map_err(|e| CliError::runtime(e.to_string()))?;
        writeln!(out, "{text}")?;
    } else {
        render::report(&mut out, &report)?;
    }

    if let Some(dir) = charts {
        let dir = expand_home(&dir);
        let written = write_charts(&dir, &report)?;
        eprintln!("wrote {written} chart(s) to {}", dir.display());
    }
    Ok(())
}

fn cmd_shell(settings: &Settings, view: Option<TimelineView>) -> Result<(), CliError> {
    let catalog = open_catalog(settings)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    shell::run(&catalog, query_options(settings, view), stdin.lock(), &mut out)?;
    Ok(())
}

fn cmd_datasets(settings: &Settings, json: bool) -> Result<(), CliError> {
    let catalog = catalog::shared(&settings.data_paths());
    let statuses = catalog.status();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let text = serde_json::to_string_pretty(&statuses).map_err(|e| CliError::runtime(e.to_string()))?;
        writeln!(out, "{text}")?;
    } else {
        render::datasets(&mut out, &statuses)?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli)?;
    tracing::debug!(data_dir = %settings.data_dir.display(), threshold = settings.threshold, "settings");

    match cli.command {
        None => cmd_shell(&settings, None),
        Some(Commands::Shell { view }) => cmd_shell(&settings, view),
        Some(Commands::Search { address, view, json, charts }) => {
            cmd_search(&settings, address, view, json, charts)
        }
        Some(Commands::Datasets { json }) => cmd_datasets(&settings, json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
