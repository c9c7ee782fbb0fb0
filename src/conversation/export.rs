//! Markdown and plain-text renderings of commits.

use crate::commit::types::{CognitiveCommit, Role, ToolCall, Turn};

use super::format::{format_absolute_time, truncate_chars};

/// Changed files listed per commit in a bulk export before summarizing.
pub const BULK_FILES_LIMIT: usize = 10;

/// Turn bodies longer than this are cut in bulk exports.
pub const BULK_CONTENT_LIMIT: usize = 500;

/// Brief argument hint for a tool call line: the file path, else the command
/// cut to 50 characters.
fn tool_hint(call: &ToolCall) -> Option<String> {
    if let Some(path) = call.input_str("file_path") {
        return Some(path.to_string());
    }
    call.input
        .get("command")
        .map(|cmd| match cmd.as_str() {
            Some(s) => truncate_chars(s, 50),
            None => truncate_chars(&cmd.to_string(), 50),
        })
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Agent",
    }
}

pub fn format_turn_markdown(turn: &Turn) -> String {
    let mut out = format!(
        "### **{}** — {}\n\n{}",
        role_label(turn.role),
        format_absolute_time(&turn.timestamp),
        turn.content
    );

    if !turn.tool_calls().is_empty() {
        out.push_str("\n\n**Tool calls:**\n");
        for call in turn.tool_calls() {
            out.push_str(&format!("- `{}`", call.name));
            if let Some(hint) = tool_hint(call) {
                out.push_str(&format!(" ({hint})"));
            }
            out.push('\n');
        }
    }
    out
}

pub fn format_turn_plain_text(turn: &Turn) -> String {
    let mut out = format!(
        "{} — {}\n\n{}",
        role_label(turn.role),
        format_absolute_time(&turn.timestamp),
        turn.content
    );

    if !turn.tool_calls().is_empty() {
        out.push_str("\n\nTool calls:\n");
        for call in turn.tool_calls() {
            out.push_str(&format!("  - {}", call.name));
            if let Some(hint) = tool_hint(call) {
                out.push_str(&format!(" ({hint})"));
            }
            out.push('\n');
        }
    }
    out
}

fn display_title(commit: &CognitiveCommit) -> &str {
    commit.title.as_deref().unwrap_or("Conversation")
}

/// Full conversation as a standalone Markdown document.
pub fn format_commit_markdown(commit: &CognitiveCommit) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# {}", display_title(commit)));
    lines.push(String::new());
    if let Some(ref hash) = commit.git_hash {
        lines.push(format!("**Git:** `{hash}`"));
    }
    lines.push(format!("**Date:** {}", format_absolute_time(&commit.closed_at)));
    if let Some(ref project) = commit.project_name {
        lines.push(format!("**Project:** {project}"));
    }
    lines.push(String::new());

    if !commit.files_changed.is_empty() {
        lines.push("**Files changed:**".to_string());
        for file in &commit.files_changed {
            lines.push(format!("- `{file}`"));
        }
        lines.push(String::new());
    }

    lines.push("---".to_string());
    lines.push(String::new());

    for turn in commit.turns() {
        lines.push(format_turn_markdown(turn));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Full conversation as plain text with underlined title.
pub fn format_commit_plain_text(commit: &CognitiveCommit) -> String {
    let title = display_title(commit);
    let mut lines: Vec<String> = Vec::new();

    lines.push(title.to_string());
    lines.push("=".repeat(title.chars().count()));
    lines.push(String::new());
    if let Some(ref hash) = commit.git_hash {
        lines.push(format!("Git: {hash}"));
    }
    lines.push(format!("Date: {}", format_absolute_time(&commit.closed_at)));
    if let Some(ref project) = commit.project_name {
        lines.push(format!("Project: {project}"));
    }
    lines.push(String::new());

    if !commit.files_changed.is_empty() {
        lines.push("Files changed:".to_string());
        for file in &commit.files_changed {
            lines.push(format!("  - {file}"));
        }
        lines.push(String::new());
    }

    lines.push("-".repeat(40));
    lines.push(String::new());

    for turn in commit.turns() {
        lines.push(format_turn_plain_text(turn));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Multi-commit Markdown digest used by `cogcommit export -f markdown`.
pub fn format_commits_markdown(commits: &[CognitiveCommit]) -> String {
    let mut md = String::from("# Cognitive Commits Export\n\n");

    for commit in commits {
        let title = commit.title.as_deref().unwrap_or_else(|| commit.short_id());

        md.push_str(&format!("## {title}\n\n"));
        md.push_str(&format!(
            "- **Project**: {}\n",
            commit.project_name.as_deref().unwrap_or("Unknown")
        ));
        md.push_str(&format!("- **Date**: {}\n", format_absolute_time(&commit.closed_at)));
        md.push_str(&format!(
            "- **Git Hash**: {}\n",
            commit.git_hash.as_deref().unwrap_or("None")
        ));
        md.push_str(&format!("- **Source**: {}\n\n", commit.source));

        if !commit.files_changed.is_empty() {
            md.push_str("### Files Changed\n\n");
            for file in commit.files_changed.iter().take(BULK_FILES_LIMIT) {
                md.push_str(&format!("- {file}\n"));
            }
            if commit.files_changed.len() > BULK_FILES_LIMIT {
                md.push_str(&format!(
                    "- ... and {} more\n",
                    commit.files_changed.len() - BULK_FILES_LIMIT
                ));
            }
            md.push('\n');
        }

        for session in &commit.sessions {
            md.push_str("### Session\n\n");
            for turn in &session.turns {
                let label = match turn.role {
                    Role::User => "**User**",
                    Role::Assistant => "**Assistant**",
                };
                md.push_str(&format!(
                    "{label}: {}\n\n",
                    truncate_chars(&turn.content, BULK_CONTENT_LIMIT)
                ));
            }
        }
        md.push_str("---\n\n");
    }

    md
}

/// Download name for a single-commit export: `"{title}-{id8}.{ext}"`.
/// Path separators in the title are replaced so the name stays a single
/// path component.
pub fn export_filename(commit: &CognitiveCommit, ext: &str) -> String {
    let title: String = commit
        .title
        .as_deref()
        .unwrap_or("conversation")
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '"' | ':') { '-' } else { c })
        .collect();
    format!("{title}-{}.{ext}", commit.short_id())
}
