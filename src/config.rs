//! Runtime configuration.
//!
//! Structural settings (catalog, limits, prompts, model parameters, store
//! field names) live in an optional YAML file. Every field has a default, so
//! running without a file uses the built-in catalog and the settings below.
//! Credentials are not part of this file; they come from the CLI or the
//! environment (see [`crate::cli`]).
//!
//! ```yaml
//! crawler:
//!   random_countries: 3
//!   concurrency: 2
//! summarization:
//!   model: gpt-4o-mini
//! catalog:
//!   Iceland:
//!     - name: RUV
//!       url: https://www.ruv.is/
//! ```

use crate::catalog::Catalog;
use crate::scrapers::profiles::ProfileConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub catalog: Catalog,
    pub crawler: CrawlerConfig,
    pub extraction: ExtractionConfig,
    pub summarization: SummarizationConfig,
    pub notion: NotionConfig,
    /// Extra fallback selector profiles keyed by host suffix.
    pub profiles: BTreeMap<String, ProfileConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// How many countries to pick per run.
    pub random_countries: usize,
    pub headlines_per_site: usize,
    /// Maximum number of sites in flight at once.
    pub concurrency: usize,
    /// Deadline for raw HTML fetches.
    pub timeout_secs: u64,
    /// Declared for compatibility; the only retry is the fallback tier.
    pub retries: u32,
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            random_countries: 5,
            headlines_per_site: 5,
            concurrency: 3,
            timeout_secs: 30,
            retries: 2,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub headline_prompt: String,
    pub content_prompt: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.firecrawl.dev".to_string(),
            timeout_secs: 60,
            headline_prompt: "Find today's most important news headlines on the front page of this news site. \
                For each headline return its title in the `title` field and its link in the `url` field, \
                converting relative links to absolute URLs."
                .to_string(),
            content_prompt: "Extract only the body text of this news article. \
                Leave out advertisements, related-article links and comment sections. \
                Return the body as plain text in the `content` field."
                .to_string(),
        }
    }
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizationConfig {
    /// Base of an OpenAI-compatible API, up to and including `/v1`.
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            system_prompt: "You are an expert news editor. Summarize the key points concisely.".to_string(),
            prompt: "Summarize the following news article in 3-4 concise sentences. \
                Preserve the most important facts and figures."
                .to_string(),
            max_tokens: 500,
            temperature: 0.5,
            timeout_secs: 60,
        }
    }
}

impl SummarizationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotionConfig {
    pub base_url: String,
    /// Value of the `Notion-Version` header.
    pub api_version: String,
    pub timeout_secs: u64,
    pub fields: FieldNames,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
            timeout_secs: 30,
            fields: FieldNames::default(),
        }
    }
}

impl NotionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Property names of the target database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldNames {
    pub title: String,
    pub summary: String,
    pub country: String,
    pub source: String,
    pub date: String,
    pub url: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            summary: "Summary".to_string(),
            country: "Country".to_string(),
            source: "Source".to_string(),
            date: "Date".to_string(),
            url: "URL".to_string(),
        }
    }
}

impl Config {
    /// Load from a YAML file, or return the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let shown = path.display().to_string();
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: shown.clone(),
                    source,
                })?;
                let config: Config = serde_yaml::from_str(&raw).map_err(|source| {
                    ConfigError::Parse {
                        path: shown.clone(),
                        source,
                    }
                })?;
                info!(path = %shown, countries = config.catalog.len(), "Loaded configuration file");
                config
            }
            None => {
                info!("No config file given; using built-in configuration");
                Config::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crawler.concurrency == 0 {
            return Err(ConfigError::Invalid("crawler.concurrency must be at least 1".into()));
        }
        if self.crawler.headlines_per_site == 0 {
            return Err(ConfigError::Invalid(
                "crawler.headlines_per_site must be at least 1".into(),
            ));
        }
        let timeouts = [
            ("crawler.timeout_secs", self.crawler.timeout_secs),
            ("extraction.timeout_secs", self.extraction.timeout_secs),
            ("summarization.timeout_secs", self.summarization.timeout_secs),
            ("notion.timeout_secs", self.notion.timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
        }
        for country in self.catalog.countries() {
            for site in self.catalog.sites(country).unwrap_or_default() {
                if let Err(e) = Url::parse(&site.url) {
                    return Err(ConfigError::Invalid(format!(
                        "catalog site `{}` ({country}) has an invalid URL `{}`: {e}",
                        site.name, site.url
                    )));
                }
            }
        }
        Ok(())
    }
}
