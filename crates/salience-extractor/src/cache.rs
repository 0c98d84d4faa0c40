//! Caching layer for extraction results
//!
//! Re-analyzing an unchanged passage costs a billable API call, so results
//! are cached by their full text using the moka crate (async-compatible,
//! bounded, TTL).
//! Failed extractions are never cached.

use async_trait::async_trait;
use moka::future::Cache;
use salience_core::{AnalysisConfig, EntityResult, ExtractionClient, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Cached client
// ============================================================================

/// Extraction client wrapper that caches results per text
pub struct CachedExtractor<E> {
    inner: E,
    cache: Cache<String, Vec<EntityResult>>,
    stats: Arc<CacheStats>,
}

impl<E: ExtractionClient> CachedExtractor<E> {
    /// Wrap a client with an explicit capacity and time-to-live
    pub fn new(inner: E, max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            inner,
            cache,
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Wrap a client using the analysis configuration
    pub fn with_config(inner: E, config: &AnalysisConfig) -> Self {
        Self::new(
            inner,
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        )
    }

    /// Get cache statistics
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Drop all cached results
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        // Wait for all pending invalidations to complete
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl<E: ExtractionClient> ExtractionClient for CachedExtractor<E> {
    async fn analyze(&self, text: &str) -> Result<Vec<EntityResult>> {
        if let Some(cached) = self.cache.get(text).await {
            self.stats.record_hit();
            tracing::debug!(client = self.inner.name(), "extraction cache hit");
            return Ok(cached);
        }
        self.stats.record_miss();

        let entities = self.inner.analyze(text).await?;
        self.cache.insert(text.to_string(), entities.clone()).await;
        Ok(entities)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Hit/miss counters for the extraction cache
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Calculate hit rate (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    /// Get a summary report
    pub fn report(&self) -> CacheStatsReport {
        CacheStatsReport {
            hits: self.hits(),
            misses: self.misses(),
            hit_rate: self.hit_rate(),
        }
    }
}

/// Serializable cache statistics report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatsReport {
    pub hits: u64,
    pub misses: u64,
    /// Hit rate (0.0 - 1.0)
    pub hit_rate: f64,
}

// ============================================================================
// Tests
// ============================================================================
