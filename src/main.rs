//! # Headline Desk
//!
//! A terminal news dashboard over the [NewsAPI](https://newsapi.org) REST
//! service. Pick a country and category for top headlines, or search by
//! keyword, date range and source, or query several companies at once and
//! get one combined table.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... headline_desk --country us --category technology
//! headline_desk -q "chip exports" --from 2025-05-01 --sentiment
//! headline_desk -e TCS -e Infosys --format table -j ./reports
//! ```
//!
//! ## Architecture
//!
//! 1. **Query building**: filters become a request for the top-headlines or
//!    everything endpoint ([`query`])
//! 2. **Fetching**: one GET per query, normalized into articles ([`news`])
//! 3. **Annotation**: optional sentiment scores ([`sentiment`])
//! 4. **Presentation**: cards, a combined table, or JSON ([`outputs`])
//!
//! Rendered output goes to stdout; logs go to stderr.

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod news;
mod outputs;
mod pipeline;
mod query;
mod sentiment;
mod utils;

use cli::Cli;
use config::Settings;
use error::NewsError;
use news::NewsClient;
use outputs::{Format, json};
use pipeline::RunOptions;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(country = ?args.country, category = ?args.category, entities = args.entities.len(), "Parsed CLI arguments");

    // Configuration problems stop everything before any request is made.
    let (settings, api_key) = match load_configuration(&args).await {
        Ok(loaded) => loaded,
        Err(e) if e.is_fatal() => {
            error!(error = %e, "Configuration error");
            eprintln!("⚠️  {e}");
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
    }

    let params = args.query_parameters(&settings);
    if let (Some(from), Some(to)) = (params.date_from, params.date_to) {
        if from > to {
            warn!(%from, %to, "Date range is reversed; the API will likely return nothing");
        }
    }

    let opts = RunOptions {
        api_key,
        base_url: settings.base_url()?,
        search: settings.search_defaults(),
        sentiment: args.sentiment,
    };
    let client = NewsClient::new()?;

    let report = pipeline::run(&client, &params, &opts).await;

    let format = args.format.unwrap_or_else(|| Format::default_for(&report));
    println!("{}", outputs::render(&report, format)?);

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_report(&report, dir).await {
            error!(error = %e, "Failed to write JSON report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = report.article_count(),
        failures = report.failure_count(),
        "Execution complete"
    );
    Ok(ExitCode::SUCCESS)
}

/// Load the config file and resolve the API key.
#[instrument(level = "info", skip_all)]
async fn load_configuration(args: &Cli) -> Result<(Settings, String), NewsError> {
    let settings = Settings::load(args.config.as_deref()).await?;
    let api_key = settings.resolve_api_key(args.api_key.as_deref())?;
    // Reject a bad base URL here rather than on first use.
    settings.base_url()?;
    info!("Configuration loaded");
    Ok((settings, api_key))
}
