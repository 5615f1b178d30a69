//! Knowledge base storage locations.

use recall_core::AppConfig;
use std::path::{Path, PathBuf};

/// Where a knowledge base keeps its two artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    /// Binary vector index artifact
    pub index: PathBuf,

    /// JSON question/answer artifact (source of truth)
    pub answers: PathBuf,
}

impl StoragePaths {
    pub fn new(index: impl Into<PathBuf>, answers: impl Into<PathBuf>) -> Self {
        Self {
            index: index.into(),
            answers: answers.into(),
        }
    }

    /// Default artifact names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join(recall_core::config::DEFAULT_INDEX_FILE),
            dir.join(recall_core::config::DEFAULT_ANSWERS_FILE),
        )
    }

    /// Artifact paths resolved from the application config.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.resolved_index_path(), config.resolved_answers_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir() {
        let paths = StoragePaths::in_dir(Path::new("/data"));
        assert_eq!(paths.index, PathBuf::from("/data/questions.index"));
        assert_eq!(paths.answers, PathBuf::from("/data/answers.json"));
    }

    #[test]
    fn test_from_app_config_honors_overrides() {
        let config = AppConfig {
            workspace: PathBuf::from("/ws"),
            answers_path: Some(PathBuf::from("/elsewhere/qa.json")),
            ..AppConfig::default()
        };

        let paths = StoragePaths::from_app_config(&config);
        assert_eq!(paths.index, PathBuf::from("/ws/.recall/questions.index"));
        assert_eq!(paths.answers, PathBuf::from("/elsewhere/qa.json"));
    }
}
