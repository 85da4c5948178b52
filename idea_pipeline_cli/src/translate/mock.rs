use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::client::TranslationBackend;
use crate::error::{TranslateError, TranslateResult};

/// In-memory backend: prefixes text with `[target]`, or fails for configured inputs.
#[derive(Debug, Clone, Default)]
pub struct MockTranslator {
    failures: Arc<Mutex<HashMap<String, TranslateError>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any call whose text equals `text` fails with `error`.
    pub fn fail_on(self, text: impl Into<String>, error: TranslateError) -> Self {
        self.failures.lock().unwrap().insert(text.into(), error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranslationBackend for MockTranslator {
    async fn translate(&self, text: &str, _source: &str, target: &str) -> TranslateResult<String> {
        self.calls.lock().unwrap().push(text.to_string());
        if let Some(err) = self.failures.lock().unwrap().get(text) {
            return Err(err.clone());
        }
        Ok(format!("[{target}] {text}"))
    }
}
