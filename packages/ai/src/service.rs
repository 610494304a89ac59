// ABOUTME: Client for the external test case generation service
// ABOUTME: Posts requirement text and returns the raw generated cases, classifying failures

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

pub const DEFAULT_GENERATION_URL: &str = "http://127.0.0.1:8001/generate";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service could not be reached at all
    #[error("Generation service unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Generation service returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response from generation service: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Whether the failure means the service is down rather than misbehaving
    pub fn is_unavailable(&self) -> bool {
        matches!(self, GenerationError::Unavailable(_))
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Produces raw test cases for a requirement text.
///
/// Cases come back in whatever shape the generator emits; callers normalize them.
#[async_trait]
pub trait TestCaseGenerator: Send + Sync {
    async fn generate(&self, text: &str) -> GenerationResult<Vec<Value>>;
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GENERATION_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    text: &'a str,
}

/// HTTP client for the generation service
#[derive(Debug, Clone)]
pub struct GenerationClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl GenerationClient {
    pub fn new(config: GenerationConfig) -> GenerationResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.url,
            timeout: config.timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TestCaseGenerator for GenerationClient {
    async fn generate(&self, text: &str) -> GenerationResult<Vec<Value>> {
        info!(
            "Requesting test case generation: url={}, timeout={}s, text_len={}",
            self.url,
            self.timeout.as_secs(),
            text.len()
        );

        let response = self
            .client
            .post(&self.url)
            .json(&GenerationRequest { text })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    error!("Failed to connect to generation service: {}", e);
                    GenerationError::Unavailable(e.to_string())
                } else if e.is_timeout() {
                    error!(
                        "Generation request timed out after {} seconds",
                        self.timeout.as_secs()
                    );
                    GenerationError::RequestFailed(e)
                } else {
                    error!("Generation request failed: {}", e);
                    GenerationError::RequestFailed(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Generation service error: {} - {}", status, error_text);
            return Err(GenerationError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let cases = match body.get("result") {
            Some(Value::Array(cases)) => cases.clone(),
            _ => {
                error!("Generation response lacks a result array");
                return Err(GenerationError::InvalidResponse(
                    "missing result array".to_string(),
                ));
            }
        };

        info!("Generation service returned {} case(s)", cases.len());
        Ok(cases)
    }
}
