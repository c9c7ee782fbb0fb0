//! Title generation for cognitive commits.

use crate::commit::types::{CognitiveCommit, Role};

pub const DEFAULT_TITLE_LENGTH: usize = 100;
pub const PREVIEW_TITLE_LENGTH: usize = 50;

/// First non-blank user message in the commit, trimmed.
pub fn extract_first_user_message(commit: &CognitiveCommit) -> Option<&str> {
    commit
        .turns()
        .filter(|t| t.role == Role::User)
        .map(|t| t.content.trim())
        .find(|c| !c.is_empty())
}

/// Title for a commit. An existing title is never overwritten; otherwise the
/// first user message is cut at a word boundary to `max_len` characters.
pub fn generate_commit_title(commit: &CognitiveCommit, max_len: usize) -> Option<String> {
    if let Some(ref title) = commit.title {
        return Some(title.clone());
    }
    extract_first_user_message(commit).map(|m| truncate_at_word(m, max_len))
}

/// Short card preview used by list views.
pub fn generate_title_preview(first_user_content: Option<&str>) -> String {
    match first_user_content.map(str::trim) {
        None | Some("") => "Empty conversation".to_string(),
        Some(content) => truncate_at_word(content, PREVIEW_TITLE_LENGTH),
    }
}

/// Cut `text` to at most `max_len` characters, dropping a trailing partial word
/// and appending `…` when anything was removed.
pub fn truncate_at_word(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_len).collect();
    let kept = match cut.rfind(char::is_whitespace) {
        Some(idx) => cut[..idx].trim_end(),
        None => cut.as_str(),
    };
    format!("{kept}…")
}
