//! Embedding configuration types.

use recall_core::{AppConfig, AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Embedding configuration for a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram", "ollama", "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Endpoint for HTTP providers
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    /// Derive the embedding settings from the application config.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            endpoint: config.endpoint.clone(),
        }
    }

    /// Check that vectors produced under `stored` can be searched with
    /// vectors produced under `self`.
    ///
    /// Vectors are only comparable when provider, model and dimensionality
    /// all agree; the endpoint does not matter.
    pub fn check_compatible(&self, stored: &Self) -> AppResult<()> {
        if self.provider != stored.provider || self.model != stored.model {
            return Err(AppError::Config(format!(
                "Embedder changed: stored vectors come from {}/{}, configured is {}/{}",
                stored.provider, stored.model, self.provider, self.model
            )));
        }

        if self.dimensions != stored.dimensions {
            return Err(AppError::DimensionMismatch {
                expected: self.dimensions,
                actual: stored.dimensions,
            });
        }

        Ok(())
    }
}
