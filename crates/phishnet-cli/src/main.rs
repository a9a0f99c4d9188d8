// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use phishnet_client::{PhishNetClient, Table};
use phishnet_config::{load as load_config, AppConfig};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "phishnet", version, about = "Query the Phish.net API")]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for fetched rows.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// List every venue.
    Venues,
    /// List shows for a single year.
    Shows {
        #[arg(long)]
        year: i32,
    },
    /// List shows across a range of years (defaults to every year).
    AllShows {
        #[arg(long)]
        from: Option<i32>,
        #[arg(long)]
        to: Option<i32>,
    },
    /// Show the setlist for one show.
    Setlist {
        #[arg(long)]
        show_id: u64,
    },
    /// Fetch setlists for every show in a year.
    AllSetlists {
        #[arg(long)]
        year: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    let client = build_client(&config)?;
    let output = run(&client, &cli.command, cli.format).await?;
    print!("{}", output);

    if let Some(request) = client.last_request().await {
        info!(target: "cli", "last request: {}", request.url);
    }
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn build_client(config: &AppConfig) -> Result<PhishNetClient> {
    let api = &config.api;
    let client = PhishNetClient::builder()
        .optional_api_key(api.api_key.clone())
        .base_url(api.base_url.clone())
        .timeout(Duration::from_secs(api.timeout_secs))
        .request_limit(api.requests_per_minute)
        .first_year(api.first_year)
        .truncation_threshold(api.truncation_threshold)
        .build()?;
    Ok(client)
}

async fn run(client: &PhishNetClient, command: &Command, format: OutputFormat) -> Result<String> {
    match command {
        Command::Venues => render(&client.get_all_venues().await?, format),
        Command::Shows { year } => render(&client.get_shows_by_year(*year).await?, format),
        Command::AllShows { from, to } => {
            let shows = match (from, to) {
                (None, None) => client.get_all_shows().await?,
                (from, to) => {
                    let (from, to) =
                        year_range(*from, *to, client.first_year(), Utc::now().year())?;
                    client.get_shows_for_years(from..=to).await?
                }
            };
            render(&shows, format)
        }
        Command::Setlist { show_id } => render(&client.get_setlist(*show_id).await?, format),
        Command::AllSetlists { year } => {
            let shows = client.get_shows_by_year(*year).await?;
            let collection = client.get_all_setlists(&shows).await?;
            if !collection.missing_show_ids.is_empty() {
                warn!(
                    target: "cli",
                    "shows without a setlist: {:?}",
                    collection.missing_show_ids
                );
            }
            render(&collection.setlists, format)
        }
    }
}

/// Resolve `--from`/`--to`, defaulting to the configured first year and the
/// current year.
fn year_range(
    from: Option<i32>,
    to: Option<i32>,
    first_year: i32,
    current_year: i32,
) -> Result<(i32, i32)> {
    let from = from.unwrap_or(first_year);
    let to = to.unwrap_or(current_year);
    if to < from {
        bail!("--to ({}) must not be earlier than --from ({})", to, from);
    }
    Ok((from, to))
}

fn render<T: Serialize>(records: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(records)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Table => Ok(Table::from_records(records)?.to_tsv()),
    }
}
