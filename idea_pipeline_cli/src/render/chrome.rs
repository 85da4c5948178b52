use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use tokio::task::JoinHandle;

use super::{RenderOptions, RenderedPage, Renderer};
use crate::error::RenderError;

/// Slack on top of navigation timeout + settle delay before the whole render is abandoned.
const RENDER_GRACE: Duration = Duration::from_secs(15);

const VISIBLE_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

/// Renders pages in a fresh headless Chrome per call.
#[derive(Debug, Clone, Default)]
pub struct ChromeRenderer {
    chrome_path: Option<PathBuf>,
}

impl ChromeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chrome_path(path: impl Into<PathBuf>) -> Self {
        Self {
            chrome_path: Some(path.into()),
        }
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<RenderedPage, RenderError> {
        let deadline = options.timeout + options.settle_delay + RENDER_GRACE;
        let target = url.to_string();
        let options = options.clone();
        let chrome_path = self.chrome_path.clone();

        tracing::info!(url, timeout = ?options.timeout, "rendering page");

        // headless_chrome is synchronous, keep it off the async workers.
        let task = tokio::task::spawn_blocking(move || render_blocking(&target, &options, chrome_path));
        join_render(task, deadline, url).await
    }
}

/// Waits for the blocking render. Past `deadline` the result is reported as a
/// timeout, but only once the task has returned and its browser is gone.
async fn join_render<T>(
    mut task: JoinHandle<Result<T, RenderError>>,
    deadline: Duration,
    url: &str,
) -> Result<T, RenderError> {
    let joined = match tokio::time::timeout(deadline, &mut task).await {
        Ok(joined) => joined,
        Err(_) => {
            tracing::warn!(url, ?deadline, "render overran its deadline, waiting for browser shutdown");
            let _ = task.await;
            return Err(RenderError::Timeout {
                url: url.to_string(),
                timeout: deadline,
            });
        }
    };
    joined.map_err(|join_err| RenderError::Script(format!("render task failed: {join_err}")))?
}

/// One time budget shared by every step of a render.
struct Budget {
    started: Instant,
    total: Duration,
}

impl Budget {
    fn new(total: Duration) -> Self {
        Self {
            started: Instant::now(),
            total,
        }
    }

    fn remaining(&self, url: &str) -> Result<Duration, RenderError> {
        match self.total.checked_sub(self.started.elapsed()) {
            Some(left) if !left.is_zero() => Ok(left),
            _ => Err(RenderError::Timeout {
                url: url.to_string(),
                timeout: self.total,
            }),
        }
    }
}

fn render_blocking(
    url: &str,
    options: &RenderOptions,
    chrome_path: Option<PathBuf>,
) -> Result<RenderedPage, RenderError> {
    let budget = Budget::new(options.timeout + options.settle_delay);

    let launch_options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .window_size(Some(options.viewport))
        .idle_browser_timeout(options.timeout + options.settle_delay + RENDER_GRACE)
        .path(chrome_path)
        .build()
        .map_err(|e| RenderError::Launch(e.to_string()))?;

    // The browser process is killed when `browser` drops, on every return path.
    let browser = Browser::new(launch_options).map_err(|e| RenderError::Launch(e.to_string()))?;
    let tab = browser
        .new_tab()
        .map_err(|e| RenderError::Launch(e.to_string()))?;

    tab.set_user_agent(&options.user_agent, None, None)
        .map_err(|e| RenderError::Script(e.to_string()))?;

    tab.set_default_timeout(budget.remaining(url)?);
    tab.navigate_to(url)
        .map_err(|e| navigation_error(url, options.timeout, e.to_string()))?;
    tab.set_default_timeout(budget.remaining(url)?);
    tab.wait_until_navigated()
        .map_err(|e| navigation_error(url, options.timeout, e.to_string()))?;

    std::thread::sleep(options.settle_delay.min(budget.remaining(url)?));

    tab.set_default_timeout(budget.remaining(url)?);
    let text = tab
        .evaluate(VISIBLE_TEXT_JS, false)
        .map_err(|e| RenderError::Script(e.to_string()))?;
    let visible_text = text
        .value
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default();

    tab.set_default_timeout(budget.remaining(url)?);
    let html = tab
        .get_content()
        .map_err(|e| RenderError::Script(e.to_string()))?;

    tracing::debug!(url, chars = visible_text.len(), "page rendered");

    Ok(RenderedPage::new(url, visible_text, html))
}

fn navigation_error(url: &str, timeout: Duration, reason: String) -> RenderError {
    let lower = reason.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        RenderError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        RenderError::Navigation {
            url: url.to_string(),
            reason,
        }
    }
}
