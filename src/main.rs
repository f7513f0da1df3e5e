//! # Headline Digest
//!
//! A news ingestion pipeline: picks a random handful of countries from a
//! site catalog, pulls the top headlines from each country's outlets,
//! extracts and summarizes every article through an LLM, and files one
//! page per article in a Notion database.
//!
//! ## Usage
//!
//! ```sh
//! headline_digest run                 # one run, results as JSON on stdout
//! headline_digest serve --port 8080   # GET / triggers a run
//! ```
//!
//! ## Architecture
//!
//! 1. **Selection**: shuffle the catalog and keep `random_countries` countries
//! 2. **Headlines**: structured extraction per site, HTML scraping as fallback
//!    (sites processed in batches of `concurrency`)
//! 3. **Content**: same two tiers per headline
//! 4. **Summarization**: one chat completion per article
//! 5. **Persistence**: one Notion page per article

use clap::Parser;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod catalog;
mod cli;
mod config;
mod error;
mod models;
mod persister;
mod pipeline;
mod scrapers;
mod selector;
mod server;
mod services;
mod summarizer;
#[cfg(test)]
mod testing;
mod utils;

use cli::{Cli, Command};
use config::Config;
use pipeline::{Context, Pipeline};
use services::Services;
use services::firecrawl::FirecrawlClient;
use services::html::ReqwestFetcher;
use services::notion::NotionStore;
use services::openai::OpenAiClient;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "headline_digest starting up");

    let args = Cli::parse();
    debug!(config = ?args.config, command = ?args.command, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref())?;
    let services = build_services(&args, &config)?;
    let ctx = Context::new(config, services)?;
    let pipeline = Pipeline::new(ctx);

    match args.command {
        Command::Run => {
            let results = pipeline.run().await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Serve { port, bind } => {
            server::serve(Arc::new(pipeline), SocketAddr::new(bind, port)).await?;
        }
    }

    Ok(())
}

/// Build the production HTTP clients from credentials and configuration.
fn build_services(args: &Cli, config: &Config) -> Result<Services, reqwest::Error> {
    Ok(Services {
        extractor: Arc::new(FirecrawlClient::new(
            args.firecrawl_api_key.clone(),
            &config.extraction,
        )?),
        completion: Arc::new(OpenAiClient::new(
            args.openai_api_key.clone(),
            &config.summarization,
        )?),
        store: Arc::new(NotionStore::new(
            args.notion_token.clone(),
            args.notion_database_id.clone(),
            &config.notion,
        )?),
        html: Arc::new(ReqwestFetcher::new(&config.crawler)?),
    })
}
