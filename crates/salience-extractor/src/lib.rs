//! Salience Extractor - Entity extraction clients and analysis pipeline
//!
//! Provides the clients that turn a passage into entities with salience
//! scores, plus the orchestrator that runs them for every compared text:
//! - Google Cloud Natural Language REST client
//! - Static in-memory client for tests and offline use
//! - Result cache keyed by text
//! - Concurrent analyzer with per-text timeout and failure policy

pub mod analyzer;
pub mod cache;
pub mod google;
pub mod stub;

pub use analyzer::{AnalysisOutcome, AnalysisRequest, Analyzer};
pub use cache::{CacheStats, CacheStatsReport, CachedExtractor};
pub use google::{Credentials, GoogleNlpClient};
pub use stub::StaticExtractor;

use salience_core::{AppConfig, ExtractionClient, Result};
use std::sync::Arc;

/// A configured extraction client and, when caching is on, its statistics
#[derive(Clone)]
pub struct ExtractionStack {
    pub client: Arc<dyn ExtractionClient>,
    pub cache_stats: Option<Arc<CacheStats>>,
}

impl ExtractionStack {
    /// Wrap a client according to the analysis settings
    pub fn wrap<E: ExtractionClient + 'static>(client: E, config: &AppConfig) -> Self {
        if config.analysis.cache_enabled {
            let cached = CachedExtractor::with_config(client, &config.analysis);
            let cache_stats = Some(cached.stats());
            Self {
                client: Arc::new(cached),
                cache_stats,
            }
        } else {
            Self {
                client: Arc::new(client),
                cache_stats: None,
            }
        }
    }

    /// Build an analyzer over this client
    pub fn analyzer(&self, config: &AppConfig) -> Analyzer {
        Analyzer::from_config(Arc::clone(&self.client), &config.analysis)
    }
}

/// Create the Natural Language API client stack from config
pub fn create_extraction_stack(config: &AppConfig) -> Result<ExtractionStack> {
    let client = GoogleNlpClient::from_config(&config.nlp)?;
    tracing::info!(base_url = %config.nlp.base_url, cache = config.analysis.cache_enabled, "Extraction client configured");
    Ok(ExtractionStack::wrap(client, config))
}
