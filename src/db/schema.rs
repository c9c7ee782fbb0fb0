//! SQL DDL for all CogCommit tables.
//!
//! Defines `cognitive_commits`, `sessions`, `turns`, and `schema_meta`. All DDL
//! uses `IF NOT EXISTS` for idempotent initialization. Sessions and turns cascade
//! on delete so pruning a commit removes its whole conversation tree.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS cognitive_commits (
    id TEXT PRIMARY KEY,
    git_hash TEXT,
    started_at TEXT NOT NULL,
    closed_at TEXT NOT NULL,
    closed_by TEXT NOT NULL CHECK(closed_by IN ('git_commit','session_end','explicit')),
    parallel INTEGER NOT NULL DEFAULT 0,
    files_read TEXT NOT NULL DEFAULT '[]',
    files_changed TEXT NOT NULL DEFAULT '[]',
    title TEXT,
    project_name TEXT,
    source TEXT NOT NULL DEFAULT 'claude_code',
    hidden INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_commits_closed_at ON cognitive_commits(closed_at);
CREATE INDEX IF NOT EXISTS idx_commits_project ON cognitive_commits(project_name);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    commit_id TEXT NOT NULL REFERENCES cognitive_commits(id) ON DELETE CASCADE,
    started_at TEXT NOT NULL,
    ended_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_commit ON sessions(commit_id);

CREATE TABLE IF NOT EXISTS turns (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK(role IN ('user','assistant')),
    content TEXT,
    timestamp TEXT NOT NULL,
    tool_calls TEXT,
    triggers_visual INTEGER NOT NULL DEFAULT 0,
    model TEXT
);

CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id);
CREATE INDEX IF NOT EXISTS idx_turns_timestamp ON turns(timestamp);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
