//! Firecrawl structured-extraction client.
//!
//! Sends `{url, formats: ["extract"], extract: {prompt, schema}}` to the
//! scrape endpoint and hands back whatever sits under `extract` in the
//! response. Both the current (`data.extract`) and the older
//! (`result.extract`) response envelopes are accepted.

use super::{ExtractRequest, StructuredExtractor, check_status};
use crate::config::ExtractionConfig;
use crate::error::FailureKind;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub struct FirecrawlClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for FirecrawlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirecrawlClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct ScrapeBody<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    extract: ExtractOptions<'a>,
}

#[derive(Serialize)]
struct ExtractOptions<'a> {
    prompt: &'a str,
    schema: &'a Value,
}

impl FirecrawlClient {
    pub fn new(api_key: String, config: &ExtractionConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl StructuredExtractor for FirecrawlClient {
    #[instrument(level = "info", skip_all, fields(url = %request.url))]
    async fn extract(&self, request: &ExtractRequest) -> Result<Option<Value>, FailureKind> {
        let t0 = Instant::now();
        let body = ScrapeBody {
            url: request.url.as_str(),
            formats: ["extract"],
            extract: ExtractOptions {
                prompt: &request.prompt,
                schema: &request.schema,
            },
        };

        let resp = self
            .client
            .post(format!("{}/v1/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "Firecrawl request failed"))?;
        let resp = check_status(resp).await?;
        let payload: Value = resp.json().await?;

        if payload.get("success").and_then(Value::as_bool) == Some(false) {
            let reason = payload
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unspecified error");
            return Err(FailureKind::Decode(format!("Firecrawl reported failure: {reason}")));
        }

        let extract = payload
            .pointer("/data/extract")
            .or_else(|| payload.pointer("/result/extract"))
            .cloned();

        let elapsed_ms = t0.elapsed().as_millis() as u64;
        match extract {
            Some(value) if !is_blank(&value) => {
                info!(elapsed_ms, "Firecrawl extraction succeeded");
                debug!(preview = %truncate_for_log(&value.to_string(), 300), "Firecrawl payload");
                Ok(Some(value))
            }
            _ => {
                info!(elapsed_ms, "Firecrawl extraction returned nothing");
                Ok(None)
            }
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FirecrawlClient {
        let config = ExtractionConfig {
            base_url: server.uri(),
            ..ExtractionConfig::default()
        };
        FirecrawlClient::new("fc-test".to_string(), &config).unwrap()
    }

    fn request() -> ExtractRequest {
        ExtractRequest {
            url: Url::parse("https://news.example/").unwrap(),
            prompt: "find headlines".to_string(),
            schema: json!({"type": "array"}),
        }
    }

    #[tokio::test]
    async fn test_extract_reads_data_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(header("authorization", "Bearer fc-test"))
            .and(body_partial_json(json!({
                "url": "https://news.example/",
                "formats": ["extract"],
                "extract": {"prompt": "find headlines"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"extract": [{"title": "A", "url": "https://news.example/a"}]}
            })))
            .mount(&server)
            .await;

        let value = client_for(&server).extract(&request()).await.unwrap().unwrap();
        assert_eq!(value[0]["title"], "A");
    }

    #[tokio::test]
    async fn test_extract_reads_result_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"extract": {"content": "Body"}}
            })))
            .mount(&server)
            .await;

        let value = client_for(&server).extract(&request()).await.unwrap().unwrap();
        assert_eq!(value["content"], "Body");
    }

    #[tokio::test]
    async fn test_empty_extract_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"extract": []}
            })))
            .mount(&server)
            .await;

        assert!(client_for(&server).extract(&request()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_status_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).extract(&request()).await.unwrap_err();
        assert!(matches!(err, FailureKind::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_unsuccessful_payload_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "blocked"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).extract(&request()).await.unwrap_err();
        assert!(err.to_string().contains("blocked"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = FirecrawlClient::new("secret".to_string(), &ExtractionConfig::default()).unwrap();
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("secret"));
    }
}
