//! Command handlers for the recall CLI.
//!
//! Every command opens the workspace knowledge base, does one thing, and
//! exits. Writes are persisted before the command returns.

pub mod add;
pub mod ask;
pub mod clean;
pub mod import;
pub mod list;
pub mod stats;

// Re-export command types for convenience
pub use add::AddCommand;
pub use ask::AskCommand;
pub use clean::CleanCommand;
pub use import::ImportCommand;
pub use list::ListCommand;
pub use stats::StatsCommand;

/// Pretty JSON for command output.
pub(crate) fn to_pretty_json<T: serde::Serialize>(value: &T) -> recall_core::AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
