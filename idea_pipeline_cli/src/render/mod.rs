//! Page rendering.
//!
//! The extractor never talks to a browser directly; it asks a [`Renderer`]
//! for the visible text and serialized DOM of a URL. [`ChromeRenderer`] is
//! the production implementation, [`StaticRenderer`] serves canned pages.

mod chrome;
mod mock;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::RenderError;

pub use chrome::ChromeRenderer;
pub use mock::StaticRenderer;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Bound on navigation and on each browser command.
    pub timeout: Duration,
    /// Extra wait after navigation for client-rendered content.
    pub settle_delay: Duration,
    pub viewport: (u32, u32),
    pub user_agent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            settle_delay: Duration::from_secs(3),
            viewport: (1920, 1080),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RenderOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A fully rendered page.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    pub url: String,
    /// `document.body.innerText` after rendering.
    pub visible_text: String,
    /// Serialized DOM after rendering.
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, visible_text: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            visible_text: visible_text.into(),
            html: html.into(),
        }
    }
}

#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<RenderedPage, RenderError>;
}
