//! Salience Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the system:
//! - Text slots being compared (original and variations)
//! - Entity results as returned by the extraction service
//! - Common error types
//! - The extraction client trait
//! - Configuration management

pub mod config;

pub use config::{
    AnalysisConfig, AppConfig, ConfigError, FailurePolicy, LoggingConfig, NlpConfig, ServerConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for salience operations
#[derive(Error, Debug)]
pub enum SalienceError {
    /// Transport, authentication or quota failure from the extraction service
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Extraction for {label} timed out after {millis}ms")]
    Timeout { label: TextLabel, millis: u64 },

    /// Malformed data returned by the extraction service (e.g. NaN salience)
    #[error("Data error: {0}")]
    Data(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SalienceError>;

// ============================================================================
// Text Labels
// ============================================================================

/// Comparison slot a passage belongs to.
///
/// The declaration order is the column order of every comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TextLabel {
    #[serde(rename = "Original")]
    Original,
    #[serde(rename = "Variation 1")]
    Variation1,
    #[serde(rename = "Variation 2")]
    Variation2,
}

impl TextLabel {
    /// All labels in fixed column order
    pub const ALL: [TextLabel; 3] = [Self::Original, Self::Variation1, Self::Variation2];

    /// Get the display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Variation1 => "Variation 1",
            Self::Variation2 => "Variation 2",
        }
    }
}

impl std::fmt::Display for TextLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TextLabel {
    type Err = SalienceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "original" | "orig" => Ok(Self::Original),
            "variation1" | "v1" => Ok(Self::Variation1),
            "variation2" | "v2" => Ok(Self::Variation2),
            _ => Err(SalienceError::Validation(format!("Unknown text label: {s}"))),
        }
    }
}

// ============================================================================
// Entity Types
// ============================================================================

/// Entity categories reported by the extraction service.
///
/// Passed through unmodified; the engine never reconciles them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Location,
    Organization,
    Event,
    WorkOfArt,
    ConsumerGood,
    Other,
    PhoneNumber,
    Address,
    Date,
    Number,
    Price,
    /// Any category this crate does not know yet
    #[default]
    #[serde(other)]
    Unknown,
}

impl EntityType {
    /// Get the wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Person => "PERSON",
            Self::Location => "LOCATION",
            Self::Organization => "ORGANIZATION",
            Self::Event => "EVENT",
            Self::WorkOfArt => "WORK_OF_ART",
            Self::ConsumerGood => "CONSUMER_GOOD",
            Self::Other => "OTHER",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::Address => "ADDRESS",
            Self::Date => "DATE",
            Self::Number => "NUMBER",
            Self::Price => "PRICE",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = std::convert::Infallible;

    /// Unrecognized names map to `Unknown`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_uppercase().as_str() {
            "PERSON" => Self::Person,
            "LOCATION" => Self::Location,
            "ORGANIZATION" => Self::Organization,
            "EVENT" => Self::Event,
            "WORK_OF_ART" => Self::WorkOfArt,
            "CONSUMER_GOOD" => Self::ConsumerGood,
            "OTHER" => Self::Other,
            "PHONE_NUMBER" => Self::PhoneNumber,
            "ADDRESS" => Self::Address,
            "DATE" => Self::Date,
            "NUMBER" => Self::Number,
            "PRICE" => Self::Price,
            _ => Self::Unknown,
        })
    }
}

// ============================================================================
// Entity Results
// ============================================================================

/// A single entity as reported for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityResult {
    /// Entity name; the alignment key across texts (exact, case-sensitive)
    pub name: String,

    /// Entity category
    #[serde(rename = "type", default)]
    pub entity_type: EntityType,

    /// Salience score in [0, 1]
    pub salience: f64,
}

impl EntityResult {
    /// Create a new entity result
    pub fn new(name: impl Into<String>, entity_type: EntityType, salience: f64) -> Self {
        Self {
            name: name.into(),
            entity_type,
            salience,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for entity extraction backends
#[async_trait::async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Extract entities with their salience from plain text
    async fn analyze(&self, text: &str) -> Result<Vec<EntityResult>>;

    /// Get client name for logging
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
impl<T: ExtractionClient + ?Sized> ExtractionClient for std::sync::Arc<T> {
    async fn analyze(&self, text: &str) -> Result<Vec<EntityResult>> {
        (**self).analyze(text).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_label_ordering() {
        assert!(TextLabel::Original < TextLabel::Variation1);
        assert!(TextLabel::Variation1 < TextLabel::Variation2);
        assert_eq!(TextLabel::ALL[0], TextLabel::Original);
    }

    #[test]
    fn test_text_label_parse() {
        assert_eq!("Original".parse::<TextLabel>().unwrap(), TextLabel::Original);
        assert_eq!(
            "Variation 1".parse::<TextLabel>().unwrap(),
            TextLabel::Variation1
        );
        assert_eq!(
            "variation_2".parse::<TextLabel>().unwrap(),
            TextLabel::Variation2
        );
        assert_eq!("v1".parse::<TextLabel>().unwrap(), TextLabel::Variation1);
        assert!("Variation 3".parse::<TextLabel>().is_err());
    }

    #[test]
    fn test_text_label_serde_uses_display_name() {
        let json = serde_json::to_string(&TextLabel::Variation2).unwrap();
        assert_eq!(json, "\"Variation 2\"");
        let parsed: TextLabel = serde_json::from_str("\"Variation 1\"").unwrap();
        assert_eq!(parsed, TextLabel::Variation1);
    }

    #[test]
    fn test_entity_type_wire_names() {
        assert_eq!(EntityType::WorkOfArt.to_string(), "WORK_OF_ART");
        assert_eq!(
            serde_json::to_string(&EntityType::ConsumerGood).unwrap(),
            "\"CONSUMER_GOOD\""
        );
        let parsed: EntityType = serde_json::from_str("\"LOCATION\"").unwrap();
        assert_eq!(parsed, EntityType::Location);
    }

    #[test]
    fn test_unknown_entity_type_falls_back() {
        let parsed: EntityType = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(parsed, EntityType::Unknown);
        assert_eq!(serde_json::to_string(&EntityType::Unknown).unwrap(), "\"UNKNOWN\"");
        assert_eq!(EntityType::default(), EntityType::Unknown);
        assert_eq!("galaxy".parse::<EntityType>().unwrap(), EntityType::Unknown);
        assert_eq!("person".parse::<EntityType>().unwrap(), EntityType::Person);
    }

    #[test]
    fn test_entity_result_deserialize() {
        let result: EntityResult =
            serde_json::from_str(r#"{"name": "Paris", "type": "LOCATION", "salience": 0.41}"#)
                .unwrap();
        assert_eq!(result, EntityResult::new("Paris", EntityType::Location, 0.41));
    }

    struct Echo;

    #[async_trait::async_trait]
    impl ExtractionClient for Echo {
        async fn analyze(&self, text: &str) -> Result<Vec<EntityResult>> {
            Ok(vec![EntityResult::new(text, EntityType::Other, 1.0)])
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_shared_client_delegates() {
        let client: std::sync::Arc<dyn ExtractionClient> = std::sync::Arc::new(Echo);
        let results = tokio_test::block_on(client.analyze("Lyon")).unwrap();

        assert_eq!(client.name(), "echo");
        assert_eq!(results[0].name, "Lyon");
    }
}
