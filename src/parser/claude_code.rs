//! Claude Code session log parser.
//!
//! Claude Code writes one JSONL file per session under
//! `~/.claude/projects/<encoded-cwd>/<session-id>.jsonl`. Every line is a
//! record; only `user` and `assistant` records become turns. A session is cut
//! into cognitive commits wherever the assistant runs `git commit`.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::commit::types::{
    ClosedBy, CognitiveCommit, ConversationSource, Role, Session, ToolCall, Turn,
};

/// Tools whose `file_path` argument counts as a read.
const READ_TOOLS: &[&str] = &["Read", "NotebookRead"];

/// Tools whose `file_path` argument counts as a change.
const WRITE_TOOLS: &[&str] = &["Edit", "Write", "MultiEdit", "NotebookEdit"];

/// One JSONL record. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogLine {
    #[serde(rename = "type")]
    kind: String,
    uuid: Option<String>,
    timestamp: Option<String>,
    session_id: Option<String>,
    cwd: Option<String>,
    #[serde(default)]
    is_meta: bool,
    message: Option<LogMessage>,
}

#[derive(Debug, Deserialize)]
struct LogMessage {
    #[serde(default)]
    content: MessageContent,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Other,
}

/// Result of parsing one session log.
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub commits: Vec<CognitiveCommit>,
    /// Lines that were not valid JSON records.
    pub skipped_lines: usize,
}

/// Parse a session log file from disk.
pub fn parse_session_file(path: &Path) -> Result<ParsedLog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session log: {}", path.display()))?;
    let fallback_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("session");
    Ok(parse_session_log(&text, fallback_id))
}

/// Parse JSONL text. `fallback_session_id` is used when records carry no
/// `sessionId`.
pub fn parse_session_log(text: &str, fallback_session_id: &str) -> ParsedLog {
    let mut turns: Vec<Turn> = Vec::new();
    // tool_use id -> (turn index, call index)
    let mut call_index: HashMap<String, (usize, usize)> = HashMap::new();
    let mut session_id: Option<String> = None;
    let mut cwd: Option<String> = None;
    let mut skipped_lines = 0;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: LogLine = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "skipping malformed log line");
                skipped_lines += 1;
                continue;
            }
        };

        let role = match record.kind.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => continue,
        };
        if record.is_meta {
            continue;
        }
        if session_id.is_none() {
            session_id = record.session_id.clone();
        }
        if cwd.is_none() {
            cwd = record.cwd.clone();
        }

        let Some(message) = record.message else {
            continue;
        };
        let timestamp = record
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        let mut text_parts: Vec<String> = Vec::new();
        let mut calls: Vec<ToolCall> = Vec::new();
        let mut results = 0;

        match message.content {
            MessageContent::Text(text) => text_parts.push(text),
            MessageContent::Blocks(blocks) => {
                for block in blocks {
                    match block {
                        ContentBlock::Text { text } => text_parts.push(text),
                        ContentBlock::ToolUse { id, name, input } => calls.push(ToolCall {
                            id,
                            name,
                            input,
                            result: None,
                            is_error: None,
                        }),
                        ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                            is_error,
                        } => {
                            results += 1;
                            if let Some(&(t, c)) = call_index.get(&tool_use_id) {
                                if let Some(call) = turns[t]
                                    .tool_calls
                                    .as_mut()
                                    .and_then(|calls| calls.get_mut(c))
                                {
                                    call.result = Some(result_text(&content));
                                    call.is_error = is_error;
                                }
                            }
                        }
                        ContentBlock::Other => {}
                    }
                }
            }
        }

        let content = text_parts.join("\n\n");
        // Tool-result carriers are bookkeeping, not conversation.
        if role == Role::User && results > 0 && content.trim().is_empty() {
            continue;
        }
        if content.trim().is_empty() && calls.is_empty() {
            continue;
        }

        let turn_idx = turns.len();
        for (call_idx, call) in calls.iter().enumerate() {
            call_index.insert(call.id.clone(), (turn_idx, call_idx));
        }

        turns.push(Turn {
            id: record
                .uuid
                .unwrap_or_else(|| uuid::Uuid::now_v7().to_string()),
            role,
            content,
            timestamp,
            model: message.model.filter(|_| role == Role::Assistant),
            tool_calls: (!calls.is_empty()).then_some(calls),
            triggers_visual_update: None,
        });
    }

    let session_id = session_id.unwrap_or_else(|| fallback_session_id.to_string());
    let project_name = cwd.as_deref().and_then(project_from_cwd);

    ParsedLog {
        commits: split_into_commits(turns, &session_id, project_name),
        skipped_lines,
    }
}

/// Cut a turn sequence after every turn that made a successful `git commit`.
fn split_into_commits(
    turns: Vec<Turn>,
    session_id: &str,
    project_name: Option<String>,
) -> Vec<CognitiveCommit> {
    let mut commits = Vec::new();
    let mut current: Vec<Turn> = Vec::new();

    for turn in turns {
        let git_hash = git_commit_in(&turn);
        current.push(turn);
        if let Some(hash) = git_hash {
            let segment = std::mem::take(&mut current);
            commits.push(build_commit(
                segment,
                session_id,
                commits.len(),
                project_name.clone(),
                ClosedBy::GitCommit,
                hash,
            ));
        }
    }

    if !current.is_empty() {
        commits.push(build_commit(
            current,
            session_id,
            commits.len(),
            project_name,
            ClosedBy::SessionEnd,
            None,
        ));
    }

    commits
}

/// `Some(hash)` when the turn ran a `git commit` that did not fail. The inner
/// hash is `None` when the output carried no recognizable `[branch hash]`.
fn git_commit_in(turn: &Turn) -> Option<Option<String>> {
    turn.tool_calls()
        .iter()
        .filter(|call| call.name == "Bash" && !call.failed())
        .find(|call| call.input_str("command").is_some_and(is_git_commit))
        .map(|call| call.result.as_deref().and_then(extract_commit_hash))
}

fn build_commit(
    turns: Vec<Turn>,
    session_id: &str,
    index: usize,
    project_name: Option<String>,
    closed_by: ClosedBy,
    git_hash: Option<String>,
) -> CognitiveCommit {
    let started_at = turns.first().map(|t| t.timestamp.clone()).unwrap_or_default();
    let closed_at = turns.last().map(|t| t.timestamp.clone()).unwrap_or_default();
    // Deterministic ids make re-imports replace rather than duplicate.
    let id = turns
        .first()
        .map(|t| t.id.clone())
        .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());

    let mut files_read = Vec::new();
    let mut files_changed = Vec::new();
    for call in turns.iter().flat_map(|t| t.tool_calls()) {
        let Some(path) = call
            .input_str("file_path")
            .or_else(|| call.input_str("notebook_path"))
        else {
            continue;
        };
        let target = if READ_TOOLS.contains(&call.name.as_str()) {
            &mut files_read
        } else if WRITE_TOOLS.contains(&call.name.as_str()) {
            &mut files_changed
        } else {
            continue;
        };
        if !target.iter().any(|p| p == path) {
            target.push(path.to_string());
        }
    }

    CognitiveCommit {
        id,
        git_hash,
        started_at: started_at.clone(),
        closed_at: closed_at.clone(),
        closed_by,
        parallel: false,
        files_read,
        files_changed,
        title: None,
        project_name,
        source: ConversationSource::ClaudeCode,
        hidden: false,
        sessions: vec![Session {
            id: format!("{session_id}-{index}"),
            started_at,
            ended_at: closed_at,
            turns,
        }],
        turn_count: None,
    }
}

/// Whether a shell command line invokes `git commit` in any of its steps.
pub fn is_git_commit(command: &str) -> bool {
    command
        .split(['\n', ';', '|', '&'])
        .any(|step| {
            let mut tokens = step.split_whitespace();
            while let Some(token) = tokens.next() {
                if token != "git" {
                    continue;
                }
                // Skip global options such as `-C <dir>` or `-c key=value`.
                while let Some(arg) = tokens.next() {
                    match arg {
                        "-C" | "-c" | "--git-dir" | "--work-tree" => {
                            tokens.next();
                        }
                        a if a.starts_with('-') => {}
                        a => return a == "commit",
                    }
                }
            }
            false
        })
}

/// Pull the abbreviated hash out of `git commit` output such as
/// `[main abc1234] Fix parser` or `[main (root-commit) abc1234] Init`.
pub fn extract_commit_hash(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let inner = line.trim().strip_prefix('[')?;
        let (bracket, _) = inner.split_once(']')?;
        let hash = bracket.split_whitespace().last()?;
        let valid = (7..=40).contains(&hash.len()) && hash.chars().all(|c| c.is_ascii_hexdigit());
        valid.then(|| hash.to_string())
    })
}

/// Tool result content is either a string or a list of text blocks.
fn result_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn project_from_cwd(cwd: &str) -> Option<String> {
    Path::new(cwd)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// All `*.jsonl` files under `root`, recursively, sorted by path.
pub fn discover_sessions(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(root, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, found)?;
        } else if path.extension().is_some_and(|ext| ext == "jsonl") {
            found.push(path);
        }
    }
    Ok(())
}
