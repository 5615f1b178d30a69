//! Import command handler.
//!
//! Reads a JSON object mapping questions to answers and ingests it in one
//! rebuild. Object order is kept, so new questions take positions in file order.

use anyhow::Context;
use clap::Args;
use recall_core::{config::AppConfig, AppError, AppResult};
use recall_knowledge::QaPair;
use std::path::PathBuf;

/// Import question/answer pairs from a JSON file
#[derive(Args, Debug)]
pub struct ImportCommand {
    /// JSON file of the form {"question": "answer", ...}
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ImportCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing import command for {:?}", self.file);

        let content = std::fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let pairs = parse_pairs(&content)
            .with_context(|| format!("Invalid import file {}", self.file.display()))?;

        let kb = recall_knowledge::open(config).await?;
        let report = kb.add_many(pairs).await?;

        if self.json {
            println!("{}", super::to_pretty_json(&report)?);
        } else {
            println!("Added {} Q&A pairs!", report.added + report.updated);
            if report.updated > 0 {
                println!("  ({} existing questions got new answers)", report.updated);
            }
        }

        Ok(())
    }
}

/// Parse `{"question": "answer"}` into pairs, keeping file order.
pub fn parse_pairs(content: &str) -> AppResult<Vec<QaPair>> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    let object = value.as_object().ok_or_else(|| {
        AppError::InvalidInput("Expected a JSON object of question/answer strings".to_string())
    })?;

    object
        .iter()
        .map(|(question, answer)| match answer.as_str() {
            Some(answer) => Ok(QaPair::new(question.as_str(), answer)),
            None => Err(AppError::InvalidInput(format!(
                "Answer for {:?} must be a string",
                question
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs_keeps_file_order() {
        let pairs = parse_pairs(r#"{"zebra": "z", "apple": "a", "mango": "m"}"#).unwrap();
        let questions: Vec<&str> = pairs.iter().map(|p| p.question.as_str()).collect();
        assert_eq!(questions, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_parse_pairs_rejects_non_string_answer() {
        assert!(matches!(
            parse_pairs(r#"{"q": 42}"#),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_pairs_rejects_array() {
        assert!(matches!(
            parse_pairs(r#"["q", "a"]"#),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_pairs_rejects_malformed_json() {
        assert!(matches!(
            parse_pairs("{"),
            Err(AppError::Serialization(_))
        ));
    }

    #[test]
    fn test_parse_empty_object() {
        assert!(parse_pairs("{}").unwrap().is_empty());
    }
}
