//! Configuration management for recall.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.recall/config.yaml)
//!
//! The configuration is workspace-centric: artifacts and the config file live
//! under `<workspace>/.recall/` unless overridden.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Name of the per-workspace data directory.
pub const DATA_DIR: &str = ".recall";

/// Default file name of the binary vector index artifact.
pub const DEFAULT_INDEX_FILE: &str = "questions.index";

/// Default file name of the question/answer artifact.
pub const DEFAULT_ANSWERS_FILE: &str = "answers.json";

/// Embedding providers the engine knows how to build.
pub const KNOWN_PROVIDERS: [&str; 3] = ["trigram", "ollama", "mock"];

/// Model used when a provider is selected without naming one.
pub fn default_model(provider: &str) -> Option<&'static str> {
    match provider {
        "trigram" => Some("trigram-v1"),
        "ollama" => Some("all-minilm"),
        "mock" => Some("mock-v1"),
        _ => None,
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .recall/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Embedding provider ("trigram", "ollama", "mock")
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Endpoint of an HTTP embedding provider
    pub endpoint: Option<String>,

    /// Override for the vector index artifact path
    pub index_path: Option<PathBuf>,

    /// Override for the answers artifact path
    pub answers_path: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    embedding: Option<EmbeddingSection>,
    storage: Option<StorageSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageSection {
    index_path: Option<PathBuf>,
    answers_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    format: Option<LogFormat>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "trigram".to_string(), // Offline default
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            index_path: None,
            answers_path: None,
            log_level: None,
            log_format: LogFormat::Pretty,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the YAML config file and defaults.
    ///
    /// Environment variables:
    /// - `RECALL_WORKSPACE`: Override workspace path
    /// - `RECALL_CONFIG`: Path to config file
    /// - `RECALL_PROVIDER`: Embedding provider
    /// - `RECALL_MODEL`: Embedding model identifier
    /// - `RECALL_DIMENSIONS`: Embedding dimensions
    /// - `OLLAMA_URL`: Endpoint for the ollama provider
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use recall_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_for(None, None)
    }

    /// Like [`AppConfig::load`], but an explicit workspace or config file
    /// (from the command line) decides which YAML file is read.
    pub fn load_for(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        } else if let Ok(workspace) = std::env::var("RECALL_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Some(config_file) = config_file {
            config.config_file = Some(config_file);
        } else if let Ok(config_file) = std::env::var("RECALL_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config.config_path();
        if config_path.exists() {
            tracing::debug!("Merging config file {:?}", config_path);
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        config.apply_env()?;

        Ok(config)
    }

    /// Path of the YAML config file this configuration reads.
    pub fn config_path(&self) -> PathBuf {
        match self.config_file {
            Some(ref cf) => cf.clone(),
            None => self.data_dir().join("config.yaml"),
        }
    }

    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(provider) = std::env::var("RECALL_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("RECALL_MODEL") {
            self.model = model;
        }

        if let Ok(dimensions) = std::env::var("RECALL_DIMENSIONS") {
            self.dimensions = dimensions.parse().map_err(|e| {
                AppError::Config(format!("Invalid RECALL_DIMENSIONS '{}': {}", dimensions, e))
            })?;
        }

        if let Ok(endpoint) = std::env::var("OLLAMA_URL") {
            self.endpoint = Some(endpoint);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.merged(config_file))
    }

    fn merged(&self, config_file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.provider = provider;
            }
            if let Some(model) = embedding.model {
                result.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.dimensions = dimensions;
            }
            if embedding.endpoint.is_some() {
                result.endpoint = embedding.endpoint;
            }
        }

        if let Some(storage) = config_file.storage {
            if storage.index_path.is_some() {
                result.index_path = storage.index_path;
            }
            if storage.answers_path.is_some() {
                result.answers_path = storage.answers_path;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        result
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            // A provider switch without an explicit model takes that provider's default
            if model.is_none() && provider != self.provider {
                if let Some(default) = default_model(&provider) {
                    self.model = default.to_string();
                }
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .recall directory.
    pub fn data_dir(&self) -> PathBuf {
        self.workspace.join(DATA_DIR)
    }

    /// Ensure the .recall directory exists.
    pub fn ensure_data_dir(&self) -> AppResult<()> {
        let data_dir = self.data_dir();
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir).map_err(|e| {
                AppError::Config(format!("Failed to create {} directory: {}", DATA_DIR, e))
            })?;
        }
        Ok(())
    }

    /// Resolved path of the vector index artifact.
    pub fn resolved_index_path(&self) -> PathBuf {
        self.resolve(self.index_path.as_deref(), DEFAULT_INDEX_FILE)
    }

    /// Resolved path of the answers artifact.
    pub fn resolved_answers_path(&self) -> PathBuf {
        self.resolve(self.answers_path.as_deref(), DEFAULT_ANSWERS_FILE)
    }

    fn resolve(&self, configured: Option<&Path>, default_name: &str) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.workspace.join(path),
            None => self.data_dir().join(default_name),
        }
    }

    /// Validate configuration for the active embedding provider.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
