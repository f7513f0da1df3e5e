//! Notion database client.
//!
//! Each article becomes one page in the configured database. Property names
//! come from [`FieldNames`] so the database schema can be renamed without a
//! rebuild.

use super::{DocumentStore, StoreEntry, check_status};
use crate::config::{FieldNames, NotionConfig};
use crate::error::FailureKind;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fmt;
use tracing::{info, instrument, warn};

/// Notion rejects rich-text segments longer than this many characters.
const MAX_TEXT_CHARS: usize = 2000;

pub struct NotionStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
    api_version: String,
    database_id: String,
    fields: FieldNames,
}

impl fmt::Debug for NotionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionStore")
            .field("base_url", &self.base_url)
            .field("database_id", &self.database_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

impl NotionStore {
    pub fn new(token: String, database_id: String, config: &NotionConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            api_version: config.api_version.clone(),
            database_id,
            fields: config.fields.clone(),
        })
    }

    /// Build the `properties` object for one entry.
    fn properties(&self, entry: &StoreEntry) -> Value {
        let mut props = Map::new();
        props.insert(
            self.fields.title.clone(),
            json!({ "title": [{ "text": { "content": clip(&entry.title) } }] }),
        );
        props.insert(
            self.fields.summary.clone(),
            json!({ "rich_text": [{ "text": { "content": clip(&entry.summary) } }] }),
        );
        props.insert(
            self.fields.country.clone(),
            json!({ "select": { "name": entry.country } }),
        );
        props.insert(
            self.fields.source.clone(),
            json!({ "rich_text": [{ "text": { "content": clip(&entry.source) } }] }),
        );
        props.insert(
            self.fields.date.clone(),
            json!({ "date": { "start": entry.date.format("%Y-%m-%d").to_string() } }),
        );
        props.insert(self.fields.url.clone(), json!({ "url": entry.url }));
        Value::Object(props)
    }
}

fn clip(text: &str) -> String {
    text.chars().take(MAX_TEXT_CHARS).collect()
}

#[async_trait]
impl DocumentStore for NotionStore {
    #[instrument(level = "info", skip_all, fields(title = %entry.title))]
    async fn create(&self, entry: &StoreEntry) -> Result<String, FailureKind> {
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": self.properties(entry),
        });

        let resp = self
            .client
            .post(format!("{}/pages", self.base_url))
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.api_version)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "Notion request failed"))?;
        let resp = check_status(resp).await?;
        let page: CreatedPage = resp.json().await?;

        info!(page_id = %page.id, "Created Notion page");
        Ok(page.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> NotionStore {
        let config = NotionConfig {
            base_url: format!("{}/v1", server.uri()),
            ..NotionConfig::default()
        };
        NotionStore::new("secret_token".to_string(), "db-123".to_string(), &config).unwrap()
    }

    fn entry() -> StoreEntry {
        StoreEntry {
            title: "Election results".to_string(),
            summary: "The vote was close.".to_string(),
            country: "Canada".to_string(),
            source: "CBC".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            url: "https://www.cbc.ca/news/1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_maps_fields_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .and(header("authorization", "Bearer secret_token"))
            .and(header("notion-version", "2022-06-28"))
            .and(body_partial_json(json!({
                "parent": {"database_id": "db-123"},
                "properties": {
                    "Title": {"title": [{"text": {"content": "Election results"}}]},
                    "Country": {"select": {"name": "Canada"}},
                    "Source": {"rich_text": [{"text": {"content": "CBC"}}]},
                    "Date": {"date": {"start": "2026-10-18"}},
                    "URL": {"url": "https://www.cbc.ca/news/1"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "page",
                "id": "page-42"
            })))
            .mount(&server)
            .await;

        let id = store_for(&server).create(&entry()).await.unwrap();
        assert_eq!(id, "page-42");
    }

    #[tokio::test]
    async fn test_validation_error_is_status_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "object": "error",
                "code": "validation_error"
            })))
            .mount(&server)
            .await;

        let err = store_for(&server).create(&entry()).await.unwrap_err();
        assert!(matches!(err, FailureKind::Status { status: 400, .. }));
    }

    #[test]
    fn test_renamed_fields_are_used() {
        let config = NotionConfig {
            fields: FieldNames {
                title: "제목".to_string(),
                ..FieldNames::default()
            },
            ..NotionConfig::default()
        };
        let store = NotionStore::new("t".to_string(), "db".to_string(), &config).unwrap();
        let props = store.properties(&entry());
        assert!(props.get("제목").is_some());
        assert!(props.get("Title").is_none());
    }

    #[test]
    fn test_long_summary_is_clipped() {
        let long = "가".repeat(MAX_TEXT_CHARS + 10);
        assert_eq!(clip(&long).chars().count(), MAX_TEXT_CHARS);
    }
}
