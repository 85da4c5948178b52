use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use url::Url;

use super::retry::{with_retry, RetryPolicy};
use crate::error::{TranslateError, TranslateResult};

pub const DEFAULT_ENDPOINT: &str = "https://libretranslate.com/translate";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One text in, one translation out. Implementations own their retry policy.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> TranslateResult<String>;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct LibreTranslateClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl LibreTranslateClient {
    pub fn new(endpoint: &str, api_key: Option<String>) -> TranslateResult<Self> {
        Self::with_timeout(endpoint, api_key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, api_key: Option<String>, timeout: Duration) -> TranslateResult<Self> {
        Url::parse(endpoint).map_err(|e| TranslateError::Config(format!("{endpoint}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TranslateError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn translate_once(&self, text: &str, source: &str, target: &str) -> TranslateResult<String> {
        let payload = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<TranslateResponse>()
                .await
                .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;
            return Ok(body.translated_text);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or(raw);

        Err(classify(status.as_u16(), message, source, target))
    }
}

fn classify(status: u16, message: String, source: &str, target: &str) -> TranslateError {
    match status {
        429 => TranslateError::RateLimited,
        403 => TranslateError::Auth(message),
        400 if message.to_lowercase().contains("language") => TranslateError::UnsupportedLanguage {
            source_lang: source.to_string(),
            target_lang: target.to_string(),
            message,
        },
        500..=599 => TranslateError::Server { status, message },
        _ => TranslateError::Rejected { status, message },
    }
}

#[async_trait]
impl TranslationBackend for LibreTranslateClient {
    async fn translate(&self, text: &str, source: &str, target: &str) -> TranslateResult<String> {
        with_retry(&self.retry, || self.translate_once(text, source, target)).await
    }
}
