use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trackmap_core::timestamps::parse_timestamp;
use trackmap_core::{execute, Config, RunError, RunParameters, RunRequest};

mod interactive;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render timestamped location samples as an animated track map",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one track map from a table of samples
    Render(RenderArgs),
    /// Prompt for inputs and render repeatedly until told to stop
    Interactive(InteractiveArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Delimited table with start time, longitude and latitude columns
    #[arg(short, long)]
    input: PathBuf,
    /// Window start, e.g. "2024-9-1 9:00:00"
    #[arg(long, value_parser = parse_bound)]
    start: NaiveDateTime,
    /// Window end (inclusive)
    #[arg(long, value_parser = parse_bound)]
    end: NaiveDateTime,
    /// Delay between consecutive points in milliseconds (1-9999)
    #[arg(long, default_value_t = 1000)]
    interval_ms: u32,
    /// Text shown next to every point, e.g. a phone number
    #[arg(long, default_value = "")]
    label: String,
    /// Output file; defaults to the configured output_file
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Map API key; overrides TRACKMAP_MAP_API_KEY and the config file
    #[arg(long)]
    map_api_key: Option<String>,
    /// Config file; defaults to ./trackmap.toml when present
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct InteractiveArgs {
    /// Config file; defaults to ./trackmap.toml when present
    #[arg(long)]
    config: Option<PathBuf>,
    /// Map API key; overrides TRACKMAP_MAP_API_KEY and the config file
    #[arg(long)]
    map_api_key: Option<String>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => handle_render(args),
        Command::Interactive(args) => handle_interactive(args),
    }
}

fn handle_render(args: RenderArgs) -> Result<()> {
    let config =
        Config::load_or_default(args.config.as_deref()).context("failed to load configuration")?;

    let parameters = RunParameters::new(
        config.resolve_api_key(args.map_api_key.as_deref()),
        args.interval_ms,
        args.label,
        args.start,
        args.end,
    )
    .map_err(RunError::from)?;

    let request = RunRequest {
        source_path: args.input,
        output_path: args.output.unwrap_or_else(|| config.output_file.clone()),
        parameters,
    };

    let summary = execute(&request, &config)?;
    println!(
        "Track map written to {} ({} points)",
        summary.output_path.display(),
        summary.point_count
    );
    Ok(())
}

fn handle_interactive(args: InteractiveArgs) -> Result<()> {
    let config =
        Config::load_or_default(args.config.as_deref()).context("failed to load configuration")?;
    let api_key = config.resolve_api_key(args.map_api_key.as_deref());
    if api_key.is_empty() {
        info!("no map API key configured; the viewer may refuse to load tiles");
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut session = interactive::Session::new(stdin.lock(), stdout.lock(), config, api_key);
    session.run().context("interactive session failed")
}

fn parse_bound(value: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(value)
        .ok_or_else(|| format!("'{value}' is not a timestamp; use YYYY-MM-DD HH:MM:SS"))
}
