//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use sheetcast_core::{ArtifactEvent, ChannelSink, run_query};
use sheetcast_grid::normalize;
use sheetcast_shared::{
    AppConfig, ArtifactEnvelope, QueryConfig, config_file_path, init_config, load_config,
    load_config_from,
};
use sheetcast_source::SourceClient;
use sheetcast_store::{HttpObjectStore, MemoryObjectStore};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Sheetcast — tabular query results as editable sheet artifacts.
#[derive(Parser)]
#[command(
    name = "sheetcast",
    version,
    about = "Query an external data source and stream the result as a sheet artifact.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use a specific config file instead of ~/.sheetcast/sheetcast.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run one query transaction and print the resulting artifact.
    Query {
        /// Natural-language prompt for the data source.
        prompt: String,

        /// Write the delivered CSV content to a file.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the full envelope as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Normalize a CSV file into a bounded grid and print its shape.
    Grid {
        /// Path to the CSV file.
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sheetcast=info",
        1 => "sheetcast=debug",
        _ => "sheetcast=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Query { prompt, out, json } => cmd_query(&config, &prompt, out, json).await,
        Command::Grid { file } => cmd_grid(&file),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

async fn cmd_query(
    config: &AppConfig,
    prompt: &str,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let query_config = QueryConfig::resolve(config)?;
    let source = SourceClient::new(&query_config)?;
    let (sink, mut rx) = ChannelSink::new();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Querying {}", query_config.source_endpoint));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    // The transaction is one sequential task; events pile up on the channel
    // in emission order and are drained once it returns.
    let envelope = match &query_config.store_endpoint {
        Some(endpoint) => {
            let store =
                HttpObjectStore::new(endpoint.clone(), query_config.store_timeout_secs)?;
            run_query(prompt, &source, &store, &sink).await?
        }
        None => {
            let store = MemoryObjectStore::new();
            run_query(prompt, &source, &store, &sink).await?
        }
    };

    spinner.finish_and_clear();

    while let Ok(event) = rx.try_recv() {
        print_event(&event);
    }

    if let Some(path) = out {
        std::fs::write(&path, &envelope.csv_data.csv_content)?;
        info!(path = %path.display(), "csv content written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        print_envelope_summary(&envelope);
    }

    Ok(())
}

fn print_event(event: &ArtifactEvent) {
    let content = event.content();
    let preview = if content.chars().count() > 60 {
        let head: String = content.chars().take(60).collect();
        format!("{head}... ({} bytes)", content.len())
    } else {
        content
    };
    println!("  event {:<12} {preview}", event.event_type());
}

fn print_envelope_summary(envelope: &ArtifactEnvelope) {
    println!();
    println!("Artifact {} ({})", envelope.id, envelope.kind);
    println!("  title:   {}", envelope.title);
    println!("  created: {}", envelope.created_at.to_rfc3339());
    if envelope.csv_url.is_empty() {
        println!(
            "  csv:     inline, {} bytes",
            envelope.csv_data.csv_content.len()
        );
    } else {
        println!("  csv:     offloaded to {}", envelope.csv_url);
    }
    if !envelope.csv_headers.is_empty() {
        println!("  headers: {}", envelope.csv_headers);
    }
}

// ---------------------------------------------------------------------------
// grid
// ---------------------------------------------------------------------------

fn cmd_grid(file: &PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(file)?;
    let grid = normalize(&text);

    println!(
        "Grid: {} rows x {} columns{}",
        grid.row_count(),
        grid.col_count(),
        if grid.truncated() { " (truncated)" } else { "" }
    );
    println!("Columns: {}", grid.column_labels().join(" "));

    // Preview the top-left corner of the grid.
    for row in grid.rows().iter().take(5) {
        let cells: Vec<&str> = row
            .cells
            .iter()
            .take(6)
            .map(String::as_str)
            .collect();
        println!("  {:>4} | {}", row.row_number, cells.join(" | "));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    println!("Config file: {}", config_file_path()?.display());
    println!("  provider mode:   {}", config.provider.mode);
    println!("  source endpoint: {}", config.source.endpoint);
    println!("  test endpoint:   {}", config.source.test_endpoint);
    println!("  brand id:        {}", config.source.brand_id);
    match &config.store.endpoint {
        Some(endpoint) => println!("  store endpoint:  {endpoint}"),
        None => println!("  store endpoint:  (none, in-memory fallback)"),
    }
    Ok(())
}
