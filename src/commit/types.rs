//! Core cognitive-commit type definitions.
//!
//! A [`CognitiveCommit`] owns an ordered list of [`Session`]s, each holding an
//! ordered list of [`Turn`]s. Assistant turns may carry [`ToolCall`] records.
//! The serde shape is camelCase so JSON exports match what the studio API and
//! the hosted dashboard consume.

use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// What ended a cognitive commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedBy {
    /// The assistant ran `git commit`.
    GitCommit,
    /// The conversation log ended without a commit.
    SessionEnd,
    /// The user closed the commit by hand.
    Explicit,
}

impl ClosedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitCommit => "git_commit",
            Self::SessionEnd => "session_end",
            Self::Explicit => "explicit",
        }
    }
}

impl std::fmt::Display for ClosedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClosedBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git_commit" => Ok(Self::GitCommit),
            "session_end" => Ok(Self::SessionEnd),
            "explicit" => Ok(Self::Explicit),
            _ => Err(format!("unknown closure type: {s}")),
        }
    }
}

/// The assistant tool a conversation was recorded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationSource {
    #[default]
    ClaudeCode,
    Cursor,
    Antigravity,
    Codex,
    Opencode,
}

impl ConversationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude_code",
            Self::Cursor => "cursor",
            Self::Antigravity => "antigravity",
            Self::Codex => "codex",
            Self::Opencode => "opencode",
        }
    }
}

impl std::fmt::Display for ConversationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConversationSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude_code" => Ok(Self::ClaudeCode),
            "cursor" => Ok(Self::Cursor),
            "antigravity" => Ok(Self::Antigravity),
            "codex" => Ok(Self::Codex),
            "opencode" => Ok(Self::Opencode),
            _ => Err(format!("unknown conversation source: {s}")),
        }
    }
}

/// Local bookkeeping for hosted-backend sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Synced,
    Conflict,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Conflict => "conflict",
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "synced" => Ok(Self::Synced),
            "conflict" => Ok(Self::Conflict),
            _ => Err(format!("unknown sync status: {s}")),
        }
    }
}

/// A single tool invocation made by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Arbitrary tool arguments (usually a JSON object).
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolCall {
    /// Look up a string-valued argument, e.g. `file_path` or `command`.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(|v| v.as_str())
    }

    pub fn failed(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

/// One message within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers_visual_update: Option<bool>,
}

impl Turn {
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}

/// A bounded run of turns inside one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub started_at: String,
    pub ended_at: String,
    #[serde(default)]
    pub turns: Vec<Turn>,
}

/// A recorded unit of AI-assisted work, closed by a git commit or session end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveCommit {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_hash: Option<String>,
    pub started_at: String,
    pub closed_at: String,
    pub closed_by: ClosedBy,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub files_read: Vec<String>,
    #[serde(default)]
    pub files_changed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default)]
    pub source: ConversationSource,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Derived when loading from storage; absent in freshly parsed commits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_count: Option<usize>,
}

impl CognitiveCommit {
    /// Total turns across sessions, preferring the stored count when sessions
    /// were not hydrated.
    pub fn total_turns(&self) -> usize {
        let counted: usize = self.sessions.iter().map(|s| s.turns.len()).sum();
        if counted == 0 {
            self.turn_count.unwrap_or(0)
        } else {
            counted
        }
    }

    /// All turns in conversation order.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.sessions.iter().flat_map(|s| s.turns.iter())
    }

    /// First 8 characters of the id, as shown by the CLI.
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
