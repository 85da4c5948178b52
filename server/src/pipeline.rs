//! One extract → translate → persist run.

use std::sync::Arc;

use idea_pipeline_cli::error::ExtractionError;
use idea_pipeline_cli::extract::Extractor;
use idea_pipeline_cli::translate::{TranslatedContent, Translator};
use serde::Serialize;
use thiserror::Error;

use crate::store::{DocumentStore, PersistenceError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub record_id: String,
    pub title: String,
    pub keywords: usize,
    pub failed_fields: Vec<String>,
}

pub struct Pipeline {
    target_url: String,
    extractor: Extractor,
    translator: Translator,
    store: Arc<dyn DocumentStore>,
}

impl Pipeline {
    pub fn new(
        target_url: String,
        extractor: Extractor,
        translator: Translator,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            target_url,
            extractor,
            translator,
            store,
        }
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        tracing::info!(url = %self.target_url, "extracting");
        let page = match self.extractor.extract(&self.target_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(error = %e, "extraction failed, writing failure record");
                if let Err(store_err) = self
                    .store
                    .create_failure_record(&self.target_url, &e.to_string())
                    .await
                {
                    tracing::error!(error = %store_err, "could not write failure record");
                }
                return Err(e.into());
            }
        };

        tracing::info!(title = %page.title, "translating");
        let content = match self.translator.translate_content(&page).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "translation unavailable, persisting original text");
                let config = self.translator.config();
                TranslatedContent::untranslated(page, &config.source_lang, &config.target_lang)
            }
        };

        tracing::info!("persisting");
        let record_id = self.store.create_record(&content).await?;

        tracing::info!(
            %record_id,
            failed_fields = content.metadata.failed_fields.len(),
            "run complete"
        );

        Ok(RunReport {
            record_id,
            title: content.original.title.clone(),
            keywords: content.original.keywords.len(),
            failed_fields: content.metadata.failed_fields,
        })
    }
}
