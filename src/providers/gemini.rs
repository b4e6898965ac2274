use super::GeminiError;
use crate::config::UpstreamConfig;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Default base URL of the generative-language API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const LIST_PAGE_SIZE: u32 = 100;

// ============================================================================
// Gemini API Types
// ============================================================================

/// One page of the upstream model catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPage {
    #[serde(default)]
    pub models: Vec<ModelRecord>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub name: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

/// Raw outcome of a generateContent call, relayed without reinterpretation.
#[derive(Debug)]
pub struct GenerateOutcome {
    pub status: StatusCode,
    pub body: String,
}

// ============================================================================
// Client
// ============================================================================

/// Outbound client for the generative-language API.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    list_timeout: Duration,
    generate_timeout: Duration,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            list_timeout: Duration::from_secs(config.list_timeout_secs),
            generate_timeout: Duration::from_secs(config.generate_timeout_secs),
            client: Client::new(),
        }
    }

    /// Fetch a single catalog page. `page_token` continues a prior listing.
    ///
    /// A non-success upstream status becomes `GeminiError::Upstream` with the
    /// status preserved for relay.
    pub async fn list_models_page(
        &self,
        api_key: &str,
        page_token: Option<&str>,
    ) -> Result<ModelPage, GeminiError> {
        let url = format!("{}/models", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("key", api_key)])
            .query(&[("pageSize", LIST_PAGE_SIZE)])
            .timeout(self.list_timeout);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let resp = request.send().await.map_err(GeminiError::from_transport)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Upstream {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        resp.json::<ModelPage>()
            .await
            .map_err(|e| GeminiError::Unexpected(e.without_url().to_string()))
    }

    /// Forward a single generation request.
    ///
    /// The upstream status and body text are returned untouched, success and
    /// failure alike; only transport-level problems become `Err`.
    pub async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        contents: &Value,
    ) -> Result<GenerateOutcome, GeminiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let resp = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "contents": contents }))
            .timeout(self.generate_timeout)
            .send()
            .await
            .map_err(GeminiError::from_transport)?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GeminiError::Unexpected(e.without_url().to_string()))?;

        Ok(GenerateOutcome { status, body })
    }
}

/// Pull `error.message` out of a structured upstream error body, falling back
/// to the raw text.
fn extract_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
