//! Conversions between local commit types and hosted-backend rows.
//!
//! The hosted tables are snake_case and scoped by `user_id`. Tool calls travel
//! as a JSON column; file lists as JSON arrays.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commit::types::{
    ClosedBy, CognitiveCommit, ConversationSource, Role, Session, ToolCall, Turn,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbCommit {
    pub id: String,
    pub user_id: String,
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
    pub title: Option<String>,
    pub project_name: Option<String>,
    #[serde(default)]
    pub source: ConversationSource,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbSession {
    pub id: String,
    pub commit_id: String,
    pub user_id: String,
    pub started_at: String,
    pub ended_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbTurn {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub role: Role,
    #[serde(default)]
    pub content: String,
    pub timestamp: String,
    pub model: Option<String>,
    pub tool_calls: Option<Value>,
    pub triggers_visual_update: Option<bool>,
}

/// Nested row shape returned by `select=*,sessions(*,turns(*))`.
#[derive(Debug, Clone, Deserialize)]
pub struct DbCommitWithRelations {
    #[serde(flatten)]
    pub commit: DbCommit,
    #[serde(default)]
    pub sessions: Vec<DbSessionWithTurns>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbSessionWithTurns {
    #[serde(flatten)]
    pub session: DbSession,
    #[serde(default)]
    pub turns: Vec<DbTurn>,
}

pub fn to_db_commit(commit: &CognitiveCommit, user_id: &str) -> DbCommit {
    DbCommit {
        id: commit.id.clone(),
        user_id: user_id.to_string(),
        git_hash: commit.git_hash.clone(),
        started_at: commit.started_at.clone(),
        closed_at: commit.closed_at.clone(),
        closed_by: commit.closed_by,
        parallel: commit.parallel,
        files_read: commit.files_read.clone(),
        files_changed: commit.files_changed.clone(),
        title: commit.title.clone(),
        project_name: commit.project_name.clone(),
        source: commit.source,
        hidden: commit.hidden,
    }
}

pub fn to_db_session(session: &Session, commit_id: &str, user_id: &str) -> DbSession {
    DbSession {
        id: session.id.clone(),
        commit_id: commit_id.to_string(),
        user_id: user_id.to_string(),
        started_at: session.started_at.clone(),
        ended_at: session.ended_at.clone(),
    }
}

pub fn to_db_turn(turn: &Turn, session_id: &str, user_id: &str) -> DbTurn {
    DbTurn {
        id: turn.id.clone(),
        session_id: session_id.to_string(),
        user_id: user_id.to_string(),
        role: turn.role,
        content: turn.content.clone(),
        timestamp: turn.timestamp.clone(),
        model: turn.model.clone(),
        tool_calls: turn
            .tool_calls
            .as_ref()
            .and_then(|calls| serde_json::to_value(calls).ok()),
        triggers_visual_update: turn.triggers_visual_update,
    }
}

pub fn transform_turn(row: DbTurn) -> Turn {
    // A malformed tool-call column degrades to no tool calls.
    let tool_calls = row
        .tool_calls
        .and_then(|v| serde_json::from_value::<Vec<ToolCall>>(v).ok());
    Turn {
        id: row.id,
        role: row.role,
        content: row.content,
        timestamp: row.timestamp,
        model: row.model,
        tool_calls,
        triggers_visual_update: row.triggers_visual_update,
    }
}

/// Nested hosted row → local commit. Sessions and turns are put back in
/// chronological order since PostgREST embeds are unordered.
pub fn transform_commit_with_relations(row: DbCommitWithRelations) -> CognitiveCommit {
    let c = row.commit;
    let mut sessions: Vec<Session> = row
        .sessions
        .into_iter()
        .map(|s| {
            let mut turns: Vec<Turn> = s.turns.into_iter().map(transform_turn).collect();
            turns.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
            Session {
                id: s.session.id,
                started_at: s.session.started_at,
                ended_at: s.session.ended_at,
                turns,
            }
        })
        .collect();
    sessions.sort_by(|a, b| a.started_at.cmp(&b.started_at));

    CognitiveCommit {
        id: c.id,
        git_hash: c.git_hash,
        started_at: c.started_at,
        closed_at: c.closed_at,
        closed_by: c.closed_by,
        parallel: c.parallel,
        files_read: c.files_read,
        files_changed: c.files_changed,
        title: c.title,
        project_name: c.project_name,
        source: c.source,
        hidden: c.hidden,
        sessions,
        turn_count: None,
    }
}
