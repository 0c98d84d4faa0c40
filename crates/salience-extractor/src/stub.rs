//! In-memory extraction client
//!
//! Returns canned results keyed by exact text. Used for tests and for
//! running the service without network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use salience_core::{EntityResult, ExtractionClient, Result, SalienceError};

#[derive(Debug, Clone)]
enum StubResponse {
    Entities(Vec<EntityResult>),
    Failure(String),
}

/// Deterministic extraction client with canned responses
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    responses: HashMap<String, StubResponse>,
    delays: HashMap<String, Duration>,
    calls: Arc<AtomicUsize>,
}

impl StaticExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `entities` whenever `text` is analyzed
    pub fn with_response(mut self, text: impl Into<String>, entities: Vec<EntityResult>) -> Self {
        self.responses
            .insert(text.into(), StubResponse::Entities(entities));
        self
    }

    /// Fail with an extraction error whenever `text` is analyzed
    pub fn with_failure(mut self, text: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .insert(text.into(), StubResponse::Failure(message.into()));
        self
    }

    /// Sleep before answering for `text`
    pub fn with_delay(mut self, text: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(text.into(), delay);
        self
    }

    /// Number of `analyze` calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionClient for StaticExtractor {
    async fn analyze(&self, text: &str) -> Result<Vec<EntityResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }

        match self.responses.get(text) {
            Some(StubResponse::Entities(entities)) => Ok(entities.clone()),
            Some(StubResponse::Failure(message)) => Err(SalienceError::Extraction(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
