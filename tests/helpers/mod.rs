#![allow(dead_code)]

use cogcommit::commit::types::{
    ClosedBy, CognitiveCommit, ConversationSource, Role, Session, ToolCall, Turn,
};
use cogcommit::db;
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// A text turn at `ts`.
pub fn turn(id: &str, role: Role, content: &str, ts: &str) -> Turn {
    Turn {
        id: id.into(),
        role,
        content: content.into(),
        timestamp: ts.into(),
        model: None,
        tool_calls: None,
        triggers_visual_update: None,
    }
}

/// An assistant turn with no text and one tool call.
pub fn tool_turn(id: &str, tool: &str, input: serde_json::Value, ts: &str) -> Turn {
    Turn {
        tool_calls: Some(vec![ToolCall {
            id: format!("{id}-call"),
            name: tool.into(),
            input,
            result: None,
            is_error: None,
        }]),
        ..turn(id, Role::Assistant, "", ts)
    }
}

/// A single-session commit closed at the last turn's timestamp. Turn ids are
/// prefixed with the commit id so commits never collide.
pub fn commit(id: &str, project: &str, turns: Vec<Turn>) -> CognitiveCommit {
    let started_at = turns
        .first()
        .map(|t| t.timestamp.clone())
        .unwrap_or_else(|| "2025-01-15T10:00:00Z".into());
    let closed_at = turns
        .last()
        .map(|t| t.timestamp.clone())
        .unwrap_or_else(|| started_at.clone());
    let turns = turns
        .into_iter()
        .map(|t| Turn {
            id: format!("{id}-{}", t.id),
            ..t
        })
        .collect();

    CognitiveCommit {
        id: id.into(),
        git_hash: None,
        started_at: started_at.clone(),
        closed_at: closed_at.clone(),
        closed_by: ClosedBy::SessionEnd,
        parallel: false,
        files_read: vec![],
        files_changed: vec![],
        title: None,
        project_name: Some(project.into()),
        source: ConversationSource::ClaudeCode,
        hidden: false,
        sessions: vec![Session {
            id: format!("{id}-s0"),
            started_at,
            ended_at: closed_at,
            turns,
        }],
        turn_count: None,
    }
}

/// Two-turn commit asking `question` at `ts`.
pub fn simple_commit(id: &str, project: &str, question: &str, ts: &str) -> CognitiveCommit {
    commit(
        id,
        project,
        vec![
            turn("u", Role::User, question, ts),
            turn("a", Role::Assistant, "On it.", ts),
        ],
    )
}

/// Insert via the store module.
pub fn insert(conn: &mut Connection, commit: &CognitiveCommit) {
    cogcommit::commit::store::insert_commit(conn, commit).unwrap();
}
