//! List command handler.

use clap::Args;
use recall_core::{config::AppConfig, AppResult};

/// Longest question shown in full by `list`.
const MAX_QUESTION_CHARS: usize = 50;

/// List the question/answer pairs in the knowledge base
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing list command");

        let kb = recall_knowledge::open(config).await?;
        let pairs = kb.list().await;

        if self.json {
            println!("{}", super::to_pretty_json(&pairs)?);
            return Ok(());
        }

        if pairs.is_empty() {
            println!("Knowledge base is empty");
            return Ok(());
        }

        println!("Current knowledge base ({} pairs):", pairs.len());
        for (position, pair) in pairs.iter().enumerate() {
            println!("{:>4}. Q: {}", position, truncate(&pair.question));
            println!("      A: {}", pair.answer);
        }

        Ok(())
    }
}

/// Shorten long questions to `MAX_QUESTION_CHARS` characters plus "...".
pub fn truncate(question: &str) -> String {
    if question.chars().count() > MAX_QUESTION_CHARS {
        let head: String = question.chars().take(MAX_QUESTION_CHARS).collect();
        format!("{}...", head)
    } else {
        question.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_question_untouched() {
        assert_eq!(truncate("What is Rust?"), "What is Rust?");
        let exact = "x".repeat(50);
        assert_eq!(truncate(&exact), exact);
    }

    #[test]
    fn test_long_question_truncated() {
        let long = "y".repeat(51);
        assert_eq!(truncate(&long), format!("{}...", "y".repeat(50)));
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let long = "é".repeat(60);
        let shown = truncate(&long);
        assert_eq!(shown.chars().count(), 53);
    }
}
