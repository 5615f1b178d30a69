//! Clean command handler.

use clap::Args;
use recall_core::{config::AppConfig, AppResult};

/// Remove every pair from the knowledge base
#[derive(Args, Debug)]
pub struct CleanCommand {}

impl CleanCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing clean command");

        let kb = recall_knowledge::open(config).await?;
        let removed = kb.list().await.len();
        kb.clear().await?;

        println!("Knowledge base cleaned ({} pairs removed)", removed);
        Ok(())
    }
}
