//! Turns a rendered page into a [`PageContent`].

pub mod dom;
pub mod text;

use std::sync::Arc;

use chrono::Utc;
use url::Url;

use crate::error::{ExtractResult, ExtractionError};
use crate::render::{RenderOptions, RenderedPage, Renderer};
use crate::{BusinessFitField, CategoryField, PageContent};

pub struct Extractor {
    renderer: Arc<dyn Renderer>,
    options: RenderOptions,
}

impl Extractor {
    pub fn new(renderer: Arc<dyn Renderer>, options: RenderOptions) -> Self {
        Self { renderer, options }
    }

    pub async fn extract(&self, url: &str) -> ExtractResult<PageContent> {
        Url::parse(url).map_err(|source| ExtractionError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let rendered = self.renderer.render(url, &self.options).await?;
        let page = parse_page(url, &rendered)?;

        let found = page.business_fit.values().filter(|f| f.is_found()).count();
        tracing::info!(
            url,
            title = %page.title,
            business_fit_found = found,
            keywords = page.keywords.len(),
            "page extracted"
        );

        Ok(page)
    }
}

/// Applies every heuristic to an already rendered page.
pub fn parse_page(url: &str, rendered: &RenderedPage) -> ExtractResult<PageContent> {
    let dom = dom::inspect(&rendered.html);
    let title = dom.best_title().ok_or_else(|| ExtractionError::NoTitle {
        url: url.to_string(),
    })?;

    let lines = text::split_lines(&rendered.visible_text);
    let mut page = PageContent::new(url.to_string(), title);
    page.scraped_at = Utc::now();
    page.published_date = text::published_date(&rendered.visible_text);

    for field in BusinessFitField::ALL {
        page.business_fit.insert(field, text::section(&lines, field.synonyms()));
    }

    for field in CategoryField::ALL {
        page.categorization.insert(field, text::category(&lines, field.synonyms()));
    }

    page.keywords = text::keywords(&lines);
    if page.keywords.is_empty() {
        page.keywords = text::chart_keywords(&dom.chart_labels);
        if !page.keywords.is_empty() {
            tracing::debug!(count = page.keywords.len(), "keywords taken from chart labels");
        }
    }

    page.open_graph = dom.open_graph;

    Ok(page)
}
