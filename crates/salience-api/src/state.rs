//! Application state management

use salience_core::AppConfig;
use salience_extractor::{Analyzer, CacheStats, ExtractionStack};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Runs extractions and builds comparisons
    pub analyzer: Analyzer,
    /// Extraction cache counters, when caching is enabled
    pub cache_stats: Option<Arc<CacheStats>>,
    /// Name of the extraction backend, for readiness reporting
    pub client_name: String,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Completed analyses
    pub analysis_count: AtomicU64,
    /// Ready status
    pub is_ready: AtomicBool,
}

impl AppState {
    /// Create new application state over a configured extraction stack
    pub fn new(config: AppConfig, stack: ExtractionStack) -> Self {
        let analyzer = stack.analyzer(&config);
        Self {
            client_name: stack.client.name().to_string(),
            cache_stats: stack.cache_stats,
            analyzer,
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            analysis_count: AtomicU64::new(0),
            is_ready: AtomicBool::new(true),
        }
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Record a completed analysis
    pub fn record_analysis(&self) {
        self.analysis_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Get completed analysis count
    pub fn get_analysis_count(&self) -> u64 {
        self.analysis_count.load(Ordering::SeqCst)
    }

    /// Cache hits and misses, zero when caching is off
    pub fn get_cache_stats(&self) -> (u64, u64) {
        self.cache_stats
            .as_ref()
            .map(|s| (s.hits(), s.misses()))
            .unwrap_or((0, 0))
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if service is ready
    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::SeqCst)
    }

    /// Set ready status
    pub fn set_ready(&self, ready: bool) {
        self.is_ready.store(ready, Ordering::SeqCst);
    }
}
