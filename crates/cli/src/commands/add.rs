//! Add command handler.

use clap::Args;
use recall_core::{config::AppConfig, AppError, AppResult};

/// Add one question/answer pair
#[derive(Args, Debug)]
pub struct AddCommand {
    /// Question text
    pub question: String,

    /// Answer returned for the question
    pub answer: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AddCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing add command");

        if self.question.trim().is_empty() || self.answer.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Both a question and an answer are required".to_string(),
            ));
        }

        let kb = recall_knowledge::open(config).await?;
        let report = kb.add_one(&self.question, &self.answer).await?;

        if self.json {
            println!("{}", super::to_pretty_json(&report)?);
        } else if report.updated > 0 {
            println!("Q&A pair updated successfully!");
        } else {
            println!("Q&A pair added successfully!");
        }

        Ok(())
    }
}
