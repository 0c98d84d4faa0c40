//! Analysis orchestrator
//!
//! Runs the "Analyze" action: extracts entities from every supplied text
//! concurrently, feeds the results to the comparison engine, and reports
//! which texts made it into the table.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use salience_compare::{build_comparison, ComparisonTable, TextEntitySet, NO_ENTITIES_MESSAGE};
use salience_core::{
    AnalysisConfig, EntityResult, ExtractionClient, FailurePolicy, Result, SalienceError,
    TextLabel,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Texts to compare, keyed by slot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub texts: BTreeMap<TextLabel, String>,
}

impl AnalysisRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text for a slot
    pub fn with_text(mut self, label: TextLabel, text: impl Into<String>) -> Self {
        self.texts.insert(label, text.into());
        self
    }

    /// Build from the three optional slots
    pub fn from_slots(
        original: Option<String>,
        variation_1: Option<String>,
        variation_2: Option<String>,
    ) -> Self {
        let texts = TextLabel::ALL
            .into_iter()
            .zip([original, variation_1, variation_2])
            .filter_map(|(label, text)| text.map(|t| (label, t)))
            .collect();

        Self { texts }
    }

    /// Slots whose text is not blank, in label order
    pub fn supplied(&self) -> Vec<(TextLabel, &str)> {
        self.texts
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(label, text)| (*label, text.as_str()))
            .collect()
    }
}

/// Result of one "Analyze" action
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub table: ComparisonTable,
    /// Slots whose results are in the table
    pub analyzed: Vec<TextLabel>,
    /// Slots dropped because of timeouts or (when degrading) failures
    pub warnings: Vec<String>,
}

impl AnalysisOutcome {
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// User-facing message when there is nothing to show
    pub fn message(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_ENTITIES_MESSAGE)
    }
}

/// Runs extractions and builds the comparison table
#[derive(Clone)]
pub struct Analyzer {
    client: Arc<dyn ExtractionClient>,
    failure_policy: FailurePolicy,
    request_timeout: Duration,
}

impl Analyzer {
    /// Create an analyzer with the default policy and timeout
    pub fn new(client: Arc<dyn ExtractionClient>) -> Self {
        Self::from_config(client, &AnalysisConfig::default())
    }

    /// Create from config
    pub fn from_config(client: Arc<dyn ExtractionClient>, config: &AnalysisConfig) -> Self {
        Self {
            client,
            failure_policy: config.failure_policy,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Analyze with the configured failure policy
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        self.analyze_with_policy(request, self.failure_policy).await
    }

    /// Analyze every supplied text and build the comparison.
    ///
    /// A timed-out extraction leaves its column out and records a warning.
    /// Other extraction failures abort under [`FailurePolicy::Abort`] and are
    /// downgraded to warnings under [`FailurePolicy::Degrade`]. Malformed
    /// scores always abort.
    pub async fn analyze_with_policy(
        &self,
        request: &AnalysisRequest,
        policy: FailurePolicy,
    ) -> Result<AnalysisOutcome> {
        let id = Uuid::new_v4();
        let supplied = request.supplied();

        tracing::info!(
            analysis_id = %id,
            texts = supplied.len(),
            client = self.client.name(),
            "Starting analysis"
        );

        let results = join_all(
            supplied
                .iter()
                .map(|(label, text)| self.extract(*label, text)),
        )
        .await;

        let mut set = TextEntitySet::new();
        let mut warnings = Vec::new();

        for (label, result) in results {
            match result {
                Ok(entities) => {
                    set.insert(label, entities)?;
                }
                Err(err @ SalienceError::Timeout { .. }) => {
                    warnings.push(format!("{label} omitted: {err}"));
                }
                Err(err) if policy == FailurePolicy::Degrade => {
                    warnings.push(format!("{label} omitted: {err}"));
                }
                Err(err) => {
                    tracing::error!(analysis_id = %id, %label, "Analysis aborted: {}", err);
                    return Err(err);
                }
            }
        }

        let table = build_comparison(&set);

        tracing::info!(
            analysis_id = %id,
            rows = table.len(),
            warnings = warnings.len(),
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            id,
            analyzed_at: Utc::now(),
            analyzed: set.labels(),
            table,
            warnings,
        })
    }

    async fn extract(
        &self,
        label: TextLabel,
        text: &str,
    ) -> (TextLabel, Result<Vec<EntityResult>>) {
        let start = Instant::now();

        let result = match tokio::time::timeout(self.request_timeout, self.client.analyze(text)).await
        {
            Ok(result) => result,
            Err(_) => Err(SalienceError::Timeout {
                label,
                millis: self.request_timeout.as_millis() as u64,
            }),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(entities) => tracing::debug!(
                %label,
                entities = entities.len(),
                elapsed_ms,
                "Extraction succeeded"
            ),
            Err(e) => tracing::warn!(%label, elapsed_ms, "Extraction failed: {}", e),
        }

        (label, result)
    }
}

// ============================================================================
// Tests
// ============================================================================
