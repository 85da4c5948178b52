//! Field-by-field translation of an extracted page.
//!
//! Every text field is chunked, paced, and sent to a [`TranslationBackend`]
//! on its own. A field whose translation fails keeps its original text and
//! is listed in [`TranslationMetadata::failed_fields`]; only systemic
//! errors (bad credentials, unsupported language pair, bad endpoint) abort
//! the whole page.

pub mod chunk;
mod client;
mod mock;
mod pacer;
mod retry;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::TranslateResult;
use crate::{BusinessFitField, CategoryField, DerivedMetrics, PageContent};

pub use client::{LibreTranslateClient, TranslationBackend, DEFAULT_ENDPOINT};
pub use mock::MockTranslator;
pub use pacer::RequestPacer;
pub use retry::{with_retry, RetryPolicy};

/// Default bound on characters per request.
pub const DEFAULT_CHUNK_SIZE: usize = 4500;

#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub source_lang: String,
    pub target_lang: String,
    pub chunk_size: usize,
    /// Minimum spacing between backend calls.
    pub request_interval: Duration,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_lang: "ko".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            request_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedFields {
    pub title: String,
    pub business_fit: BTreeMap<BusinessFitField, String>,
    pub keywords: Vec<String>,
    pub categorization: BTreeMap<CategoryField, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationMetadata {
    pub source_lang: String,
    pub target_lang: String,
    pub total_characters: usize,
    pub api_calls: usize,
    pub duration_ms: u64,
    pub failed_fields: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedContent {
    pub original: PageContent,
    pub translated: TranslatedFields,
    pub metadata: TranslationMetadata,
}

pub fn title_id() -> String {
    "title".to_string()
}

pub fn business_fit_id(field: BusinessFitField) -> String {
    format!("businessFit.{}", field.key())
}

pub fn keyword_id(index: usize) -> String {
    format!("keywords[{index}]")
}

pub fn category_id(field: CategoryField) -> String {
    format!("categorization.{}", field.key())
}

impl TranslatedContent {
    /// Identity translation with every field marked failed, for when the
    /// translation service is unusable.
    pub fn untranslated(page: PageContent, source_lang: &str, target_lang: &str) -> Self {
        let mut failed_fields = vec![title_id()];
        failed_fields.extend(BusinessFitField::ALL.into_iter().map(business_fit_id));
        failed_fields.extend((0..page.keywords.len()).map(keyword_id));
        failed_fields.extend(CategoryField::ALL.into_iter().map(category_id));

        let translated = TranslatedFields {
            title: page.title.clone(),
            business_fit: BusinessFitField::ALL
                .into_iter()
                .map(|f| (f, page.business_fit_text(f).to_string()))
                .collect(),
            keywords: page.keywords.iter().map(|k| k.name.clone()).collect(),
            categorization: CategoryField::ALL
                .into_iter()
                .map(|f| (f, page.category_text(f).to_string()))
                .collect(),
        };

        Self {
            original: page,
            translated,
            metadata: TranslationMetadata {
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
                failed_fields,
                ..TranslationMetadata::default()
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        self.metadata.failed_fields.is_empty()
    }

    pub fn report(&self) -> TranslatedReport<'_> {
        TranslatedReport {
            content: self,
            derived_metrics: self.original.derived_metrics(),
        }
    }
}

/// Translated content plus metrics of the original page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedReport<'a> {
    #[serde(flatten)]
    pub content: &'a TranslatedContent,
    pub derived_metrics: DerivedMetrics,
}

#[derive(Default)]
struct Tally {
    characters: usize,
    calls: usize,
    failed: Vec<String>,
}

pub struct Translator {
    backend: Arc<dyn TranslationBackend>,
    config: TranslatorConfig,
    pacer: RequestPacer,
}

impl Translator {
    pub fn new(backend: Arc<dyn TranslationBackend>, config: TranslatorConfig) -> Self {
        let pacer = RequestPacer::every(config.request_interval);
        Self {
            backend,
            config,
            pacer,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translates every text field of `page`.
    ///
    /// Field-level failures fall back to the original text. Systemic
    /// failures are returned as errors.
    pub async fn translate_content(&self, page: &PageContent) -> TranslateResult<TranslatedContent> {
        let started = Instant::now();
        let mut tally = Tally::default();

        tracing::info!(
            source = %self.config.source_lang,
            target = %self.config.target_lang,
            keywords = page.keywords.len(),
            "translating page"
        );

        let title = self.translate_field(&title_id(), &page.title, &mut tally).await?;

        let mut business_fit = BTreeMap::new();
        for field in BusinessFitField::ALL {
            let text = page.business_fit_text(field);
            let translated = self.translate_field(&business_fit_id(field), text, &mut tally).await?;
            business_fit.insert(field, translated);
        }

        let mut keywords = Vec::with_capacity(page.keywords.len());
        for (index, keyword) in page.keywords.iter().enumerate() {
            keywords.push(self.translate_field(&keyword_id(index), &keyword.name, &mut tally).await?);
        }

        let mut categorization = BTreeMap::new();
        for field in CategoryField::ALL {
            let text = page.category_text(field);
            let translated = self.translate_field(&category_id(field), text, &mut tally).await?;
            categorization.insert(field, translated);
        }

        let metadata = TranslationMetadata {
            source_lang: self.config.source_lang.clone(),
            target_lang: self.config.target_lang.clone(),
            total_characters: tally.characters,
            api_calls: tally.calls,
            duration_ms: started.elapsed().as_millis() as u64,
            failed_fields: tally.failed,
        };

        tracing::info!(
            calls = metadata.api_calls,
            characters = metadata.total_characters,
            failed = metadata.failed_fields.len(),
            duration_ms = metadata.duration_ms,
            "translation finished"
        );

        Ok(TranslatedContent {
            original: page.clone(),
            translated: TranslatedFields {
                title,
                business_fit,
                keywords,
                categorization,
            },
            metadata,
        })
    }

    /// Translates a single piece of text, chunking as needed.
    pub async fn translate(&self, text: &str) -> TranslateResult<String> {
        self.translate_text(text, &mut Tally::default()).await
    }

    async fn translate_field(&self, id: &str, text: &str, tally: &mut Tally) -> TranslateResult<String> {
        match self.translate_text(text, tally).await {
            Ok(translated) => Ok(translated),
            Err(err) if err.is_systemic() => {
                tracing::error!(field = id, error = %err, "translation aborted");
                Err(err)
            }
            Err(err) => {
                tracing::warn!(field = id, error = %err, "translation failed, keeping original text");
                tally.failed.push(id.to_string());
                Ok(text.to_string())
            }
        }
    }

    async fn translate_text(&self, text: &str, tally: &mut Tally) -> TranslateResult<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let chunks = chunk::split_into_chunks(text, self.config.chunk_size);
        let mut translated = Vec::with_capacity(chunks.len());

        for piece in &chunks {
            if piece.trim().is_empty() {
                translated.push(piece.clone());
                continue;
            }
            self.pacer.wait().await;
            tally.characters += piece.chars().count();
            tally.calls += 1;
            let result = self
                .backend
                .translate(piece, &self.config.source_lang, &self.config.target_lang)
                .await?;
            translated.push(result);
        }

        Ok(chunk::join_chunks(&translated))
    }
}
