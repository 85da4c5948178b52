use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{RenderOptions, RenderedPage, Renderer};
use crate::error::RenderError;

/// Serves canned pages by URL; unknown URLs fail as navigation errors.
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    pages: Arc<Mutex<HashMap<String, RenderedPage>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, page: RenderedPage) -> Self {
        self.pages.lock().unwrap().insert(page.url.clone(), page);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for StaticRenderer {
    async fn render(&self, url: &str, _options: &RenderOptions) -> Result<RenderedPage, RenderError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| RenderError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
    }
}
