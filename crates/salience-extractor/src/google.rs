//! Google Cloud Natural Language client
//!
//! Calls the `documents:analyzeEntities` REST method and maps each returned
//! entity to an [`EntityResult`]. Credentials are passed in explicitly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use salience_core::{EntityResult, EntityType, ExtractionClient, NlpConfig, Result, SalienceError};
use serde::{Deserialize, Serialize};

/// Default public endpoint
pub const DEFAULT_BASE_URL: &str = "https://language.googleapis.com";

/// Credentials for the Natural Language API
#[derive(Clone)]
pub enum Credentials {
    /// API key, sent as the `key` query parameter
    ApiKey(String),
    /// OAuth2 access token, sent as a bearer token
    AccessToken(String),
}

impl Credentials {
    /// Pick credentials from config, preferring an access token
    pub fn from_config(config: &NlpConfig) -> Result<Self> {
        match (&config.access_token, &config.api_key) {
            (Some(token), _) => Ok(Self::AccessToken(token.clone())),
            (None, Some(key)) => Ok(Self::ApiKey(key.clone())),
            (None, None) => Err(SalienceError::Config(
                "Natural Language API credentials required (NLP_API_KEY or NLP_ACCESS_TOKEN)"
                    .to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => write!(f, "ApiKey(***)"),
            Self::AccessToken(_) => write!(f, "AccessToken(***)"),
        }
    }
}

/// Natural Language API client
pub struct GoogleNlpClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeEntitiesRequest<'a> {
    document: Document<'a>,
    encoding_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    document_type: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeEntitiesResponse {
    #[serde(default)]
    entities: Vec<ApiEntity>,
    #[serde(default)]
    language: Option<String>,
}

// Zero-valued fields are omitted from the JSON response
#[derive(Debug, Deserialize)]
struct ApiEntity {
    name: String,
    #[serde(rename = "type", default)]
    entity_type: EntityType,
    #[serde(default)]
    salience: f64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GoogleNlpClient {
    /// Create a new client against the public endpoint
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
        }
    }

    /// Create from config
    pub fn from_config(config: &NlpConfig) -> Result<Self> {
        let credentials = Credentials::from_config(config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SalienceError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            credentials,
        })
    }

    /// Set custom base URL (for proxies or test servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/documents:analyzeEntities",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ExtractionClient for GoogleNlpClient {
    async fn analyze(&self, text: &str) -> Result<Vec<EntityResult>> {
        let body = AnalyzeEntitiesRequest {
            document: Document {
                document_type: "PLAIN_TEXT",
                content: text,
            },
            encoding_type: "UTF8",
        };

        let request = self.client.post(self.endpoint()).json(&body);
        let request = match &self.credentials {
            Credentials::ApiKey(key) => request.query(&[("key", key)]),
            Credentials::AccessToken(token) => request.bearer_auth(token),
        };

        let response = request
            .send()
            .await
            .map_err(|e| SalienceError::Extraction(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorEnvelope>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            let reason = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication failed",
                StatusCode::TOO_MANY_REQUESTS => "quota exhausted",
                _ => "request failed",
            };
            return Err(SalienceError::Extraction(format!(
                "Natural Language API {reason} ({status}): {detail}"
            )));
        }

        let result: AnalyzeEntitiesResponse = response
            .json()
            .await
            .map_err(|e| SalienceError::Extraction(format!("Failed to parse response: {e}")))?;

        tracing::debug!(
            entities = result.entities.len(),
            language = result.language.as_deref().unwrap_or("unknown"),
            "analyzeEntities completed"
        );

        Ok(result
            .entities
            .into_iter()
            .map(|e| EntityResult::new(e.name, e.entity_type, e.salience))
            .collect())
    }

    fn name(&self) -> &str {
        "google-nlp"
    }
}

// ============================================================================
// Tests
// ============================================================================
