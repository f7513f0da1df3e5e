//! Command-line interface definitions for Headline Digest.
//!
//! Structural settings live in the YAML config; credentials and deployment
//! knobs come from flags, each with an environment-variable fallback.

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Command-line arguments for the Headline Digest application.
///
/// # Examples
///
/// ```sh
/// # One run, results printed as JSON
/// headline_digest run
///
/// # HTTP trigger on port 9000 with a custom catalog
/// headline_digest -c ./config.yaml serve --port 9000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Firecrawl API key for structured extraction
    #[arg(long, env = "FIRECRAWL_API_KEY", hide_env_values = true)]
    pub firecrawl_api_key: String,

    /// OpenAI API key for summarization
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: String,

    /// Notion database receiving one page per article
    #[arg(long, env = "NOTION_DATABASE_ID")]
    pub notion_database_id: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Perform one run and print the results as JSON
    Run,
    /// Serve the HTTP trigger until SIGINT/SIGTERM
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,

        /// Address to bind
        #[arg(long, env = "BIND", default_value = "0.0.0.0")]
        bind: IpAddr,
    },
}
