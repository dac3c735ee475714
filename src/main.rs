use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mdisco::config::{self, Config};
use mdisco::metrics::{format_api_error, HttpMetricsClient};
use mdisco::output::{self, OutputFormat};
use mdisco::resource::{get_all_resource_type_keys, get_resource_type, ResourceSource};
use mdisco::DiscoveryError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Discover cloud resources from the metrics catalog
#[derive(Parser, Debug)]
#[command(name = "mdisco", version, about, long_about = None)]
struct Args {
    /// Resource type to discover (see --list-kinds)
    #[arg(short, long)]
    kind: Option<String>,

    /// Look up a single resource by name
    #[arg(short, long)]
    name: Option<String>,

    /// Metrics catalog endpoint
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Region used to build the default endpoint
    #[arg(short, long)]
    region: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Persist endpoint, region and kind as defaults
    #[arg(long)]
    save: bool,

    /// List the known resource types and exit
    #[arg(long)]
    list_kinds: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("mdisco started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("mdisco").join("mdisco.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".mdisco").join("mdisco.log");
    }
    PathBuf::from("mdisco.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:?}");
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:?}", err);
            eprintln!("Error: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    if args.list_kinds {
        for key in get_all_resource_type_keys() {
            if let Some(def) = get_resource_type(key) {
                println!("{:<16} {}", key, def.display_name);
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // CLI > env > config file > defaults
    let mut config = Config::load();
    config.apply_overrides(
        args.endpoint.as_deref(),
        args.region.as_deref(),
        args.kind.as_deref(),
    );
    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| config.effective_endpoint());
    config::validate_endpoint(&endpoint)?;
    let kind = config.effective_resource_type();

    tracing::info!("Using endpoint: {}, kind: {}", endpoint, kind);

    // Only explicit choices are persisted; resolved defaults stay unpinned
    if args.save {
        config.save().context("Failed to save configuration")?;
    }

    let client = HttpMetricsClient::new(&endpoint)?.with_token(config.effective_token());
    let source = ResourceSource::for_type(client, &kind)?;

    match &args.name {
        Some(name) => match source.discover_one(name).await? {
            Some(resource) => {
                print!("{}", output::render_one(&resource, args.output)?);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("{} '{}' not found", source.definition().display_name, name);
                Ok(ExitCode::FAILURE)
            }
        },
        None => {
            let resources = source.discover_all().await?;
            print!("{}", output::render_set(&resources, args.output)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<DiscoveryError>() {
        Some(DiscoveryError::Transport(inner)) => format_api_error(inner),
        Some(other) => other.to_string(),
        None => format!("{err:#}"),
    }
}
