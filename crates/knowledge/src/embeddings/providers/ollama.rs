//! Ollama Embedding Provider
//!
//! Produces sentence embeddings through a local Ollama server, e.g. with the
//! `all-minilm` model (the MiniLM-L6 family, 384 dimensions).
//!
//! Construction sends a check request; if the server is unreachable or the
//! model answers with the wrong dimensionality the provider is reported as
//! [`AppError::ModelUnavailable`], which is fatal for the engine.
//!
//! # Example
//! ```no_run
//! use recall_knowledge::embeddings::{EmbeddingConfig, EmbeddingProvider};
//! use recall_knowledge::embeddings::providers::ollama::OllamaProvider;
//!
//! # async fn run() -> recall_core::AppResult<()> {
//! let config = EmbeddingConfig {
//!     provider: "ollama".to_string(),
//!     model: "all-minilm".to_string(),
//!     dimensions: 384,
//!     ..Default::default()
//! };
//!
//! let provider = OllamaProvider::new(config).await?;
//! let embedding = provider.embed("How do I reset my password?").await?;
//! assert_eq!(embedding.len(), 384);
//! # Ok(())
//! # }
//! ```

use crate::embeddings::EmbeddingConfig;
use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use recall_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDINGS_PATH: &str = "/api/embeddings";

/// Sentence embedded once at startup to check the model.
const CHECK_TEXT: &str = "connection check";

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 100;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Ollama embedding provider using local API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

impl OllamaProvider {
    /// Create a provider and verify the model answers.
    ///
    /// The base URL is taken from `config.endpoint`, then `OLLAMA_URL`, then
    /// `http://localhost:11434`.
    ///
    /// # Errors
    /// * `AppError::ModelUnavailable` - Ollama is not reachable, the model is
    ///   missing, or it returns vectors of another dimensionality
    pub async fn new(config: EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::ModelUnavailable(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        let base_url = config
            .endpoint
            .clone()
            .or_else(|| std::env::var("OLLAMA_URL").ok())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let provider = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model,
            dimensions: config.dimensions,
        };

        provider.check_model().await?;

        Ok(provider)
    }

    /// Embed a fixed sentence and check the vector length.
    #[instrument(skip(self), fields(model = %self.model))]
    async fn check_model(&self) -> AppResult<()> {
        debug!("Probing Ollama at {}", self.base_url);

        let vector = self.request_with_backoff(CHECK_TEXT).await.map_err(|e| {
            error!("Ollama model check failed: {}", e);
            AppError::ModelUnavailable(format!(
                "Cannot reach embedding model '{}' at {} ({}). Start Ollama and run: ollama pull {}",
                self.model, self.base_url, e, self.model
            ))
        })?;

        if vector.len() != self.dimensions {
            return Err(AppError::ModelUnavailable(format!(
                "Embedding model '{}' produces {}-dimensional vectors, configured for {}",
                self.model,
                vector.len(),
                self.dimensions
            )));
        }

        debug!("Embedding model '{}' is ready", self.model);
        Ok(())
    }

    /// One embeddings request, retried with exponential backoff.
    async fn request_with_backoff(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);

        for attempt in 1..=MAX_ATTEMPTS {
            match self.request(text).await {
                Ok(vector) => return Ok(vector),
                Err(e) if attempt == MAX_ATTEMPTS => return Err(e),
                Err(e) => {
                    warn!(
                        "Embedding request failed (attempt {}/{}): {}; retrying in {:?}",
                        attempt, MAX_ATTEMPTS, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }

        Err(AppError::Embedding("No embedding attempts were made".to_string()))
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn request(&self, text: &str) -> AppResult<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, EMBEDDINGS_PATH))
            .json(&EmbeddingsRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(AppError::Embedding(format!(
                "Ollama returned {}: {}",
                status, reason
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Unexpected Ollama response: {}", e)))?;

        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), provider = "ollama", model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimensions]);
        }

        let embedding = self.request_with_backoff(text).await?;
        if embedding.len() != self.dimensions {
            return Err(AppError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "ollama", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        // The embeddings endpoint takes one prompt per request
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }

        debug!("Embedded batch of {} texts", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "ollama".to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
            ..Default::default()
        }
    }

    /// Helper to check if Ollama is running
    async fn is_ollama_running() -> bool {
        let Ok(client) = Client::builder().timeout(Duration::from_secs(2)).build() else {
            return false;
        };

        let base = std::env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        client.get(format!("{}/api/tags", base)).send().await.is_ok()
    }

    #[tokio::test]
    async fn test_unreachable_server_is_model_unavailable() {
        let config = EmbeddingConfig {
            // Port 9 (discard) on localhost refuses HTTP connections
            endpoint: Some("http://127.0.0.1:9".to_string()),
            ..create_test_config()
        };

        let result = OllamaProvider::new(config).await;
        assert!(matches!(result, Err(AppError::ModelUnavailable(_))));
    }

    #[tokio::test]
    async fn test_embed_batch() {
        if !is_ollama_running().await {
            println!("Skipping test: Ollama not running");
            return;
        }

        let Ok(provider) = OllamaProvider::new(create_test_config()).await else {
            println!("Skipping test: model not installed");
            return;
        };

        let texts = vec!["First text".to_string(), "Second text".to_string()];
        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        for embedding in embeddings {
            assert_eq!(embedding.len(), 384);
            assert!(embedding.iter().any(|&x| x != 0.0));
        }
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        if !is_ollama_running().await {
            println!("Skipping test: Ollama not running");
            return;
        }

        let Ok(provider) = OllamaProvider::new(create_test_config()).await else {
            println!("Skipping test: model not installed");
            return;
        };

        let embedding = provider.embed("   ").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}
