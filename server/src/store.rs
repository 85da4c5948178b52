use async_trait::async_trait;
use idea_pipeline_cli::translate::TranslatedContent;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("document store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected document store response: {0}")]
    InvalidResponse(String),
}

/// Where finished runs are written.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists a bilingual record and returns its id.
    async fn create_record(&self, content: &TranslatedContent) -> Result<String, PersistenceError>;

    /// Persists a record describing a run that produced no content.
    async fn create_failure_record(&self, url: &str, error: &str) -> Result<String, PersistenceError>;
}

#[cfg(test)]
pub mod memory {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone)]
    pub enum Stored {
        Record(Box<TranslatedContent>),
        Failure { url: String, error: String },
    }

    #[derive(Debug, Clone, Default)]
    pub struct MemoryStore {
        pub stored: Arc<Mutex<Vec<Stored>>>,
    }

    impl MemoryStore {
        pub fn records(&self) -> Vec<Stored> {
            self.stored.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryStore {
        async fn create_record(&self, content: &TranslatedContent) -> Result<String, PersistenceError> {
            let mut stored = self.stored.lock().unwrap();
            stored.push(Stored::Record(Box::new(content.clone())));
            Ok(format!("record-{}", stored.len()))
        }

        async fn create_failure_record(&self, url: &str, error: &str) -> Result<String, PersistenceError> {
            let mut stored = self.stored.lock().unwrap();
            stored.push(Stored::Failure {
                url: url.to_string(),
                error: error.to_string(),
            });
            Ok(format!("failure-{}", stored.len()))
        }
    }
}
