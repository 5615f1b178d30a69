//! Ask command handler.

use clap::Args;
use recall_core::{config::AppConfig, AppError, AppResult};
use recall_knowledge::{MatchKind, QueryResult};

/// Answer a question from the knowledge base
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Question to answer
    pub query: String,

    /// Number of candidates to search (only the best answer is shown)
    #[arg(short = 'k', long, default_value = "1")]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask options: {:?}", self);

        if self.top_k == 0 {
            return Err(AppError::InvalidInput(
                "--top-k must be at least 1".to_string(),
            ));
        }

        let kb = recall_knowledge::open(config).await?;
        let result = kb.ask(&self.query, self.top_k).await?;

        if self.json {
            println!("{}", super::to_pretty_json(&result)?);
        } else {
            print!("{}", render(&result));
        }

        Ok(())
    }
}

/// Human-readable rendering of a query result.
pub fn render(result: &QueryResult) -> String {
    let mut out = format!("Answer:\n{}\n", result.answer);

    if result.kind == MatchKind::EmptyBase {
        return out;
    }

    out.push_str("\nDetails:\n");
    out.push_str(&format!("  Confidence score: {:.4}\n", result.distance));
    out.push_str(&format!("  Matched position: {}\n", result.position));
    out
}
