//! Stats command handler.

use clap::Args;
use recall_core::{config::AppConfig, AppResult};

/// Show knowledge base statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let kb = recall_knowledge::open(config).await?;
        let stats = kb.stats().await;

        if self.json {
            let output = serde_json::json!({
                "pairsCount": stats.pairs_count,
                "dimensions": stats.dimensions,
                "provider": stats.provider,
                "model": stats.model,
                "indexSizeBytes": stats.index_size_bytes,
                "answersSizeBytes": stats.answers_size_bytes,
                "lastRebuildAt": stats.last_rebuild_at,
            });
            println!("{}", super::to_pretty_json(&output)?);
        } else {
            println!("Knowledge base: {}", config.data_dir().display());
            println!("  Pairs: {}", stats.pairs_count);
            println!("  Embedder: {} ({}, {} dims)", stats.provider, stats.model, stats.dimensions);
            println!("  Index size: {} bytes", stats.index_size_bytes);
            println!("  Answers size: {} bytes", stats.answers_size_bytes);
            if let Some(last_rebuild) = stats.last_rebuild_at {
                println!("  Last rebuild: {}", last_rebuild);
            }
        }

        Ok(())
    }
}
