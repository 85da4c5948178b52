//! Notion persistence: one database page per run.
//!
//! Properties hold the short, filterable values (title, URL, dates,
//! counters, tags). The long bilingual prose goes into the page body as
//! blocks. Notion caps a rich-text value at 2000 characters and a single
//! request at 100 child blocks, so long text is split into consecutive
//! blocks and extra blocks are appended after the page is created.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use idea_pipeline_cli::translate::TranslatedContent;
use idea_pipeline_cli::{BusinessFitField, CategoryField};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};

use crate::store::{DocumentStore, PersistenceError};

pub const NOTION_API: &str = "https://api.notion.com";
const NOTION_VERSION: &str = "2022-06-28";

pub const MAX_RICH_TEXT: usize = 2000;
pub const MAX_CHILDREN: usize = 100;
const MAX_OPTION_LEN: usize = 100;
const MAX_MULTI_SELECT: usize = 100;

pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(api_key: &str, database_id: &str) -> Result<Self, PersistenceError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| PersistenceError::InvalidResponse(format!("invalid API key header: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: NOTION_API.to_string(),
            database_id: database_id.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, PersistenceError> {
        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body["message"].as_str().unwrap_or("unknown error").to_string();
            return Err(PersistenceError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    async fn create_page(&self, properties: Value, children: Vec<Value>) -> Result<String, PersistenceError> {
        let mut batches = children.chunks(MAX_CHILDREN);
        let first = batches.next().map(<[Value]>::to_vec).unwrap_or_default();

        let payload = json!({
            "parent": { "database_id": self.database_id },
            "properties": properties,
            "children": first,
        });
        let created = self
            .send(self.client.post(format!("{}/v1/pages", self.base_url)).json(&payload))
            .await?;
        let page_id = created["id"]
            .as_str()
            .ok_or_else(|| PersistenceError::InvalidResponse("page id missing".to_string()))?
            .to_string();

        for batch in batches {
            self.send(
                self.client
                    .patch(format!("{}/v1/blocks/{}/children", self.base_url, page_id))
                    .json(&json!({ "children": batch })),
            )
            .await?;
        }

        tracing::info!(%page_id, blocks = children.len(), "notion page created");
        Ok(page_id)
    }
}

#[async_trait]
impl DocumentStore for NotionClient {
    async fn create_record(&self, content: &TranslatedContent) -> Result<String, PersistenceError> {
        self.create_page(record_properties(content), record_blocks(content))
            .await
    }

    async fn create_failure_record(&self, url: &str, error: &str) -> Result<String, PersistenceError> {
        let properties = json!({
            "Name": { "title": rich_text("Scrape failed") },
            "URL": { "url": url },
            "Status": { "select": { "name": "Failed" } },
            "Scraped At": { "date": { "start": Utc::now().to_rfc3339() } },
        });
        self.create_page(properties, paragraphs(error)).await
    }
}

/// Splits on character boundaries into pieces of at most `max_chars`.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

pub fn rich_text(text: &str) -> Vec<Value> {
    split_text(text, MAX_RICH_TEXT)
        .into_iter()
        .map(|piece| json!({ "type": "text", "text": { "content": piece } }))
        .collect()
}

fn block(kind: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "type": kind,
        kind: { "rich_text": rich_text(text) },
    })
}

/// One block per 2000-character piece, in reading order.
pub fn paragraphs(text: &str) -> Vec<Value> {
    split_text(text, MAX_RICH_TEXT)
        .iter()
        .map(|piece| block("paragraph", piece))
        .collect()
}

fn quotes(text: &str) -> Vec<Value> {
    split_text(text, MAX_RICH_TEXT)
        .iter()
        .map(|piece| block("quote", piece))
        .collect()
}

/// Select option names cannot contain commas and are capped at 100 chars.
fn option_name(raw: &str) -> Option<String> {
    let cleaned: String = raw.replace(',', " ").trim().chars().take(MAX_OPTION_LEN).collect();
    let cleaned = cleaned.trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn select(raw: &str) -> Value {
    match option_name(raw) {
        Some(name) => json!({ "select": { "name": name } }),
        None => json!({ "select": null }),
    }
}

pub fn record_properties(content: &TranslatedContent) -> Value {
    let original = &content.original;
    let translated = &content.translated;
    let metrics = original.derived_metrics();

    let keywords: Vec<Value> = translated
        .keywords
        .iter()
        .filter_map(|k| option_name(k))
        .take(MAX_MULTI_SELECT)
        .map(|name| json!({ "name": name }))
        .collect();

    let market = translated
        .categorization
        .get(&CategoryField::Market)
        .map(String::as_str)
        .unwrap_or("");
    let idea_type = translated
        .categorization
        .get(&CategoryField::Type)
        .map(String::as_str)
        .unwrap_or("");

    let mut properties = json!({
        "Name": { "title": rich_text(&translated.title) },
        "Original Title": { "rich_text": rich_text(&original.title) },
        "URL": { "url": original.source_url },
        "Scraped At": { "date": { "start": original.scraped_at.to_rfc3339() } },
        "Status": { "select": { "name": "Success" } },
        "Word Count": { "number": metrics.word_count },
        "Keyword Count": { "number": metrics.keyword_count },
        "Avg Volume": { "number": metrics.avg_keyword_volume },
        "High Growth Keywords": { "number": metrics.high_growth_keywords },
        "Translation Calls": { "number": content.metadata.api_calls },
        "Keywords": { "multi_select": keywords },
        "Market": select(market),
        "Type": select(idea_type),
        "Failed Fields": { "rich_text": rich_text(&content.metadata.failed_fields.join(", ")) },
    });

    if let Some(date) = original.published_date {
        properties["Published"] = json!({ "date": { "start": date.format("%Y-%m-%d").to_string() } });
    }
    properties
}

pub fn record_blocks(content: &TranslatedContent) -> Vec<Value> {
    let original = &content.original;
    let translated = &content.translated;
    let mut blocks = Vec::new();

    for field in BusinessFitField::ALL {
        let source = original.business_fit_text(field);
        if source.is_empty() {
            continue;
        }
        let text = translated
            .business_fit
            .get(&field)
            .map(String::as_str)
            .unwrap_or(source);
        blocks.push(block("heading_2", field.label()));
        blocks.extend(paragraphs(text));
        blocks.extend(quotes(source));
    }

    if !original.keywords.is_empty() {
        blocks.push(block("heading_2", "Keywords"));
        for (index, keyword) in original.keywords.iter().enumerate() {
            let name = translated.keywords.get(index).unwrap_or(&keyword.name);
            let line = format!(
                "{} ({}) | {} | {:+}% ({})",
                name,
                keyword.name,
                keyword.volume,
                keyword.growth_percent,
                keyword.trend.as_str()
            );
            blocks.push(block("bulleted_list_item", &line));
        }
    }

    let categories: Vec<(CategoryField, &str)> = CategoryField::ALL
        .into_iter()
        .filter_map(|f| {
            translated
                .categorization
                .get(&f)
                .map(String::as_str)
                .filter(|t| !t.is_empty())
                .map(|t| (f, t))
        })
        .collect();
    if !categories.is_empty() {
        blocks.push(block("heading_2", "Categorization"));
        for (field, text) in categories {
            blocks.push(block("bulleted_list_item", &format!("{}: {}", field.label(), text)));
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use idea_pipeline_cli::{ExtractedField, Keyword, PageContent};

    fn content() -> TranslatedContent {
        let mut page = PageContent::new("https://ideas.test".into(), "Invoice autopilot".into());
        page.business_fit.insert(
            BusinessFitField::Problems,
            ExtractedField::found("Late payments hurt cash flow."),
        );
        page.categorization.insert(CategoryField::Market, ExtractedField::found("B2B, SMB"));
        page.keywords.push(Keyword::new("invoice app", 22_000, 12.0));
        TranslatedContent::untranslated(page, "en", "ko")
    }

    #[test]
    fn long_text_splits_in_order() {
        let text: String = (0..4500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let blocks = paragraphs(&text);
        assert_eq!(blocks.len(), 3);

        let rebuilt: String = blocks
            .iter()
            .map(|b| b["paragraph"]["rich_text"][0]["text"]["content"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(rebuilt, text);
        assert!(blocks.iter().all(|b| {
            b["paragraph"]["rich_text"][0]["text"]["content"].as_str().unwrap().chars().count() <= MAX_RICH_TEXT
        }));
    }

    #[test]
    fn multibyte_text_splits_on_chars() {
        let text = "가".repeat(MAX_RICH_TEXT + 1);
        let pieces = split_text(&text, MAX_RICH_TEXT);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[1], "가");
    }

    #[test]
    fn properties_map_metrics_and_tags() {
        let props = record_properties(&content());
        assert_eq!(props["Name"]["title"][0]["text"]["content"], "Invoice autopilot");
        assert_eq!(props["URL"]["url"], "https://ideas.test");
        assert_eq!(props["Keyword Count"]["number"], 1);
        assert_eq!(props["Avg Volume"]["number"], 22_000);
        assert_eq!(props["Market"]["select"]["name"], "B2B  SMB");
        assert_eq!(props["Type"]["select"], Value::Null);
        assert_eq!(props["Keywords"]["multi_select"][0]["name"], "invoice app");
        assert!(props.get("Published").is_none());
    }

    #[test]
    fn blocks_skip_missing_sections() {
        let blocks = record_blocks(&content());
        let headings: Vec<_> = blocks
            .iter()
            .filter(|b| b["type"] == "heading_2")
            .map(|b| b["heading_2"]["rich_text"][0]["text"]["content"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(headings, vec!["Problems", "Keywords", "Categorization"]);
    }

    #[tokio::test]
    async fn creates_page_then_appends_overflow_blocks() {
        let server = MockServer::start();
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/pages")
                .header("Notion-Version", NOTION_VERSION)
                .header("authorization", "Bearer secret");
            then.status(200).json_body(json!({ "object": "page", "id": "page-123" }));
        });
        let append = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH).path("/v1/blocks/page-123/children");
            then.status(200).json_body(json!({ "object": "list" }));
        });

        let client = NotionClient::new("secret", "db-1").unwrap().with_base_url(server.base_url());
        let blocks: Vec<Value> = (0..250).map(|i| block("paragraph", &i.to_string())).collect();
        let id = client.create_page(json!({}), blocks).await.unwrap();

        assert_eq!(id, "page-123");
        create.assert();
        assert_eq!(append.hits(), 2);
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/pages");
            then.status(400).json_body(json!({ "object": "error", "message": "Name is not a property" }));
        });

        let client = NotionClient::new("secret", "db-1").unwrap().with_base_url(server.base_url());
        let err = client.create_record(&content()).await.unwrap_err();
        match err {
            PersistenceError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Name is not a property");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
