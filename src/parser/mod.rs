//! Conversation log parsers.
//!
//! - [`claude_code`]: Claude Code JSONL session logs
//! - [`parse_export`]: JSON produced by `cogcommit export -f json`

pub mod claude_code;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::commit::types::CognitiveCommit;

/// Which parser an import should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    ClaudeCode,
    Json,
}

impl std::str::FromStr for ImportSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude_code" | "claude-code" => Ok(Self::ClaudeCode),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown import source: {s} (expected claude_code or json)")),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExportDocument {
    Many(Vec<CognitiveCommit>),
    One(Box<CognitiveCommit>),
}

/// Parse an export document: a JSON array of commits, or a single commit.
/// Stored counts are dropped so they are recomputed on load.
pub fn parse_export(json: &str) -> Result<Vec<CognitiveCommit>> {
    let doc: ExportDocument =
        serde_json::from_str(json).context("failed to parse export JSON")?;
    let mut commits = match doc {
        ExportDocument::Many(commits) => commits,
        ExportDocument::One(commit) => vec![*commit],
    };
    for commit in &mut commits {
        commit.turn_count = None;
    }
    Ok(commits)
}
