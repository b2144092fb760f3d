//! spark-dashboard CLI: replay recorded Spark polls through the dashboard store.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use spark_dashboard::config::{Config, LoggingConfig};
use spark_dashboard::services::spark_analyzer::{
    parse_file_scan, spark_api_reducer, AlertEngine, ApiAction, AppStore,
};
use spark_dashboard::utils::AnalyzerError;

#[derive(Parser)]
#[command(
    name = "spark-dashboard",
    about = "Derive Spark dashboard state from recorded API polls",
    version
)]
struct Cli {
    /// Configuration file (default: conf/config.toml or config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay poll snapshots (*.json, one action per file) in file-name order
    Replay {
        /// Directory holding the snapshots
        dir: PathBuf,
    },
    /// Parse a single plan description and print the extracted fields
    ParsePlan {
        /// Node label, e.g. "Scan parquet db.events"
        #[arg(long)]
        node_name: String,
        /// Plan text file (default: stdin)
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let _guard = init_logging(&config.logging)?;

    match cli.command {
        Commands::Replay { dir } => {
            let engine = AlertEngine::with_config(config.alerts.to_engine_config()?);
            let state = cmd_replay(&dir, &engine)?;
            println!("{}", serde_json::to_string_pretty(&*state)?);
        },
        Commands::ParsePlan { node_name, file } => {
            let text = read_plan_text(file.as_deref())?;
            let parsed = parse_file_scan(&text, &node_name);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        },
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&logging.level)
        .with_context(|| format!("Invalid logging.level '{}'", logging.level))?;

    match &logging.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().context("logging.file has no file name")?;
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::daily(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        },
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .init();
            Ok(None)
        },
    }
}

fn snapshot_files(dir: &Path) -> Result<Vec<PathBuf>, AnalyzerError> {
    let entries = fs::read_dir(dir).map_err(|e| AnalyzerError::snapshot_io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| AnalyzerError::snapshot_io(dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn load_action(path: &Path) -> Result<ApiAction, AnalyzerError> {
    let content = fs::read_to_string(path).map_err(|e| AnalyzerError::snapshot_io(path, e))?;
    serde_json::from_str(&content).map_err(|e| AnalyzerError::snapshot_format(path, e))
}

fn cmd_replay(dir: &Path, engine: &AlertEngine) -> Result<Arc<AppStore>> {
    let files = snapshot_files(dir)?;
    if files.is_empty() {
        tracing::warn!("No snapshots found in {}", dir.display());
    }

    let mut state = Arc::new(AppStore::default());
    for path in &files {
        let action = load_action(path)?;
        let next = spark_api_reducer(&state, action, engine)
            .with_context(|| format!("Failed to apply {}", path.display()))?;

        if Arc::ptr_eq(&state, &next) {
            tracing::debug!("{}: no change", path.display());
        } else {
            tracing::info!(
                "{}: {} queries, {} alerts",
                path.display(),
                next.sql.as_ref().map(|s| s.len()).unwrap_or(0),
                next.alerts.as_ref().map(|a| a.len()).unwrap_or(0)
            );
        }
        state = next;
    }

    Ok(state)
}

fn read_plan_text(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan text from {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("Failed to read plan text from stdin")?;
            Ok(text)
        },
    }
}
