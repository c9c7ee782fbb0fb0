//! Commit repository: write path, hydration, listing, updates, and deletion.
//!
//! [`insert_commit`] writes a commit with its sessions and turns in a single
//! transaction. Read functions hydrate the full conversation tree; turns are
//! ordered by timestamp and sessions by start time.

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use serde::{Deserialize, Serialize};

use crate::commit::types::{CognitiveCommit, Session, SyncStatus, ToolCall, Turn};
use crate::conversation::title::{
    extract_first_user_message, generate_commit_title, DEFAULT_TITLE_LENGTH,
};

/// Shortest id prefix accepted by [`get_commit`].
pub const MIN_ID_PREFIX: usize = 4;

const COMMIT_COLUMNS: &str = "id, git_hash, started_at, closed_at, closed_by, parallel, \
     files_read, files_changed, title, project_name, source, hidden";

/// Filter for [`list_commits`].
#[derive(Debug, Clone, Default)]
pub struct CommitFilter {
    pub project: Option<String>,
    pub include_hidden: bool,
    pub limit: Option<usize>,
}

/// Partial update applied by [`update_commit`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitPatch {
    pub title: Option<String>,
    pub hidden: Option<bool>,
}

/// Project name with its commit count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCount {
    pub name: String,
    pub count: u64,
}

/// Insert (or replace) a commit and its whole conversation tree.
///
/// A title is generated from the first user message when the commit has none.
/// Replacing an existing commit drops its old sessions first so stale turns do
/// not linger.
pub fn insert_commit(conn: &mut Connection, commit: &CognitiveCommit) -> Result<()> {
    let tx = conn.transaction()?;
    write_commit(&tx, commit, SyncStatus::Pending)?;
    tx.commit()?;
    Ok(())
}

/// Same as [`insert_commit`] but records the given sync state.
pub fn insert_commit_with_status(
    conn: &mut Connection,
    commit: &CognitiveCommit,
    status: SyncStatus,
) -> Result<()> {
    let tx = conn.transaction()?;
    write_commit(&tx, commit, status)?;
    tx.commit()?;
    Ok(())
}

/// What [`import_commit`] did with an incoming commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Inserted,
    /// The commit grew since the last import and was replaced.
    Updated,
    Unchanged,
}

/// Store a freshly parsed commit, merging with an earlier import of it.
///
/// New commits are inserted. A commit with the same turn count as the stored
/// copy is left alone. A commit that grew is replaced, keeping the stored
/// title and hidden flag so user edits survive re-imports.
pub fn import_commit(conn: &mut Connection, commit: &CognitiveCommit) -> Result<ImportOutcome> {
    // Exact match only; a prefix hit would be a different commit.
    let existing = if commit_exists(conn, &commit.id)? {
        get_commit(conn, &commit.id)?
    } else {
        None
    };

    match existing {
        None => {
            insert_commit(conn, commit)?;
            Ok(ImportOutcome::Inserted)
        }
        Some(existing) if existing.total_turns() == commit.total_turns() => {
            Ok(ImportOutcome::Unchanged)
        }
        Some(existing) => {
            let mut merged = commit.clone();
            merged.title = existing.title.or(merged.title);
            merged.hidden = existing.hidden;
            insert_commit(conn, &merged)?;
            Ok(ImportOutcome::Updated)
        }
    }
}

fn write_commit(tx: &Transaction, commit: &CognitiveCommit, status: SyncStatus) -> Result<()> {
    let title = generate_commit_title(commit, DEFAULT_TITLE_LENGTH);
    let now = chrono::Utc::now().to_rfc3339();

    tx.execute("DELETE FROM sessions WHERE commit_id = ?1", params![commit.id])?;
    tx.execute(
        "INSERT OR REPLACE INTO cognitive_commits \
         (id, git_hash, started_at, closed_at, closed_by, parallel, files_read, files_changed, \
          title, project_name, source, hidden, created_at, sync_status) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            commit.id,
            commit.git_hash,
            commit.started_at,
            commit.closed_at,
            commit.closed_by.as_str(),
            commit.parallel,
            serde_json::to_string(&commit.files_read)?,
            serde_json::to_string(&commit.files_changed)?,
            title,
            commit.project_name,
            commit.source.as_str(),
            commit.hidden,
            now,
            status.as_str(),
        ],
    )?;

    for session in &commit.sessions {
        tx.execute(
            "INSERT OR REPLACE INTO sessions (id, commit_id, started_at, ended_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![session.id, commit.id, session.started_at, session.ended_at],
        )?;
        for turn in &session.turns {
            upsert_turn(tx, &session.id, turn)?;
        }
    }

    tracing::debug!(
        id = %commit.id,
        sessions = commit.sessions.len(),
        turns = commit.total_turns(),
        "stored commit"
    );
    Ok(())
}

/// Insert or replace a single turn under an existing session.
pub fn upsert_turn(conn: &Connection, session_id: &str, turn: &Turn) -> Result<()> {
    let tool_calls = match turn.tool_calls {
        Some(ref calls) if !calls.is_empty() => Some(serde_json::to_string(calls)?),
        _ => None,
    };

    conn.execute(
        "INSERT OR REPLACE INTO turns \
         (id, session_id, role, content, timestamp, tool_calls, triggers_visual, model) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            turn.id,
            session_id,
            turn.role.as_str(),
            turn.content,
            turn.timestamp,
            tool_calls,
            turn.triggers_visual_update.unwrap_or(false),
            turn.model,
        ],
    )?;
    Ok(())
}

/// Whether a commit with this exact id is stored.
pub fn commit_exists(conn: &Connection, id: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM cognitive_commits WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Resolve a full id or unambiguous prefix to a stored id.
pub fn resolve_commit_id(conn: &Connection, id_or_prefix: &str) -> Result<Option<String>> {
    if commit_exists(conn, id_or_prefix)? {
        return Ok(Some(id_or_prefix.to_string()));
    }
    if id_or_prefix.chars().count() < MIN_ID_PREFIX {
        return Ok(None);
    }

    let pattern = format!("{}%", escape_like(id_or_prefix));
    let mut stmt =
        conn.prepare("SELECT id FROM cognitive_commits WHERE id LIKE ?1 ESCAPE '\\' LIMIT 2")?;
    let ids: Vec<String> = stmt
        .query_map(params![pattern], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    match ids.len() {
        0 => Ok(None),
        1 => Ok(ids.into_iter().next()),
        _ => bail!("commit id prefix '{id_or_prefix}' is ambiguous"),
    }
}

/// Load one commit with its sessions and turns. Accepts an id prefix.
pub fn get_commit(conn: &Connection, id_or_prefix: &str) -> Result<Option<CognitiveCommit>> {
    let Some(id) = resolve_commit_id(conn, id_or_prefix)? else {
        return Ok(None);
    };

    let commit = conn
        .query_row(
            &format!("SELECT {COMMIT_COLUMNS} FROM cognitive_commits WHERE id = ?1"),
            params![id],
            row_to_commit,
        )
        .optional()?;

    match commit {
        Some(mut commit) => {
            hydrate(conn, &mut commit)?;
            Ok(Some(commit))
        }
        None => Ok(None),
    }
}

/// List commits, newest `closed_at` first, fully hydrated.
pub fn list_commits(conn: &Connection, filter: &CommitFilter) -> Result<Vec<CognitiveCommit>> {
    let mut sql = format!("SELECT {COMMIT_COLUMNS} FROM cognitive_commits WHERE 1=1");
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(ref project) = filter.project {
        args.push(Box::new(project.clone()));
        sql.push_str(&format!(" AND project_name = ?{}", args.len()));
    }
    if !filter.include_hidden {
        sql.push_str(" AND hidden = 0");
    }
    sql.push_str(" ORDER BY julianday(closed_at) DESC");
    if let Some(limit) = filter.limit {
        args.push(Box::new(limit as i64));
        sql.push_str(&format!(" LIMIT ?{}", args.len()));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut commits: Vec<CognitiveCommit> = stmt
        .query_map(rusqlite::params_from_iter(args.iter()), row_to_commit)?
        .collect::<Result<Vec<_>, _>>()?;

    for commit in &mut commits {
        hydrate(conn, commit)?;
    }
    Ok(commits)
}

/// Commits closed strictly before `before` (RFC 3339), optionally per project.
/// Compared as instants so mixed offsets and fractional seconds order correctly.
pub fn commits_before(
    conn: &Connection,
    before: &str,
    project: Option<&str>,
) -> Result<Vec<CognitiveCommit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMMIT_COLUMNS} FROM cognitive_commits \
         WHERE julianday(closed_at) < julianday(?1) AND (?2 IS NULL OR project_name = ?2) \
         ORDER BY julianday(closed_at) DESC"
    ))?;
    let commits = stmt
        .query_map(params![before, project], row_to_commit)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(commits)
}

/// Commits whose local changes have not been pushed yet, including ones a
/// pull flagged as conflicting.
pub fn pending_sync(conn: &Connection, project: Option<&str>) -> Result<Vec<CognitiveCommit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMMIT_COLUMNS} FROM cognitive_commits \
         WHERE sync_status IN ('pending', 'conflict') AND (?1 IS NULL OR project_name = ?1) \
         ORDER BY julianday(closed_at)"
    ))?;
    let mut commits: Vec<CognitiveCommit> = stmt
        .query_map(params![project], row_to_commit)?
        .collect::<Result<Vec<_>, _>>()?;
    for commit in &mut commits {
        hydrate(conn, commit)?;
    }
    Ok(commits)
}

pub fn mark_synced(conn: &Connection, id: &str) -> Result<()> {
    conn.execute(
        "UPDATE cognitive_commits SET sync_status = 'synced', synced_at = ?1 WHERE id = ?2",
        params![chrono::Utc::now().to_rfc3339(), id],
    )?;
    Ok(())
}

/// Sync state of a stored commit, `None` when it does not exist.
pub fn sync_status(conn: &Connection, id: &str) -> Result<Option<SyncStatus>> {
    let status: Option<String> = conn
        .query_row(
            "SELECT sync_status FROM cognitive_commits WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    status
        .map(|s| s.parse::<SyncStatus>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()
}

pub fn set_sync_status(conn: &Connection, id: &str, status: SyncStatus) -> Result<()> {
    conn.execute(
        "UPDATE cognitive_commits SET sync_status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(())
}

/// Distinct project names with commit counts, most active first.
pub fn list_projects(conn: &Connection) -> Result<Vec<ProjectCount>> {
    let mut stmt = conn.prepare(
        "SELECT project_name, COUNT(*) AS n FROM cognitive_commits \
         WHERE project_name IS NOT NULL AND hidden = 0 \
         GROUP BY project_name ORDER BY n DESC, project_name",
    )?;
    let projects = stmt
        .query_map([], |row| {
            Ok(ProjectCount {
                name: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(projects)
}

/// Apply a title/hidden patch. Returns the updated commit, or `None` if it
/// does not exist. Any change marks the commit for re-sync.
pub fn update_commit(
    conn: &Connection,
    id_or_prefix: &str,
    patch: &CommitPatch,
) -> Result<Option<CognitiveCommit>> {
    let Some(id) = resolve_commit_id(conn, id_or_prefix)? else {
        return Ok(None);
    };

    if let Some(ref title) = patch.title {
        let title = title.trim();
        let value = if title.is_empty() { None } else { Some(title) };
        conn.execute(
            "UPDATE cognitive_commits SET title = ?1, sync_status = 'pending' WHERE id = ?2",
            params![value, id],
        )?;
    }
    if let Some(hidden) = patch.hidden {
        conn.execute(
            "UPDATE cognitive_commits SET hidden = ?1, sync_status = 'pending' WHERE id = ?2",
            params![hidden, id],
        )?;
    }

    get_commit(conn, &id)
}

/// Delete a commit; sessions and turns cascade. Returns `true` if a row was removed.
pub fn delete_commit(conn: &Connection, id: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM cognitive_commits WHERE id = ?1", params![id])?;
    if removed > 0 {
        tracing::debug!(id, "deleted commit");
    }
    Ok(removed > 0)
}

/// Whether a commit is worth showing in list views: it has turns, and its
/// opening user message is not a tool warmup ping.
pub fn is_displayable(commit: &CognitiveCommit) -> bool {
    if commit.total_turns() == 0 {
        return false;
    }
    let first = extract_first_user_message(commit).unwrap_or("");
    !first.to_lowercase().contains("warmup")
}

/// Load sessions and turns into `commit`, and set `turn_count`.
fn hydrate(conn: &Connection, commit: &mut CognitiveCommit) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT id, started_at, ended_at FROM sessions WHERE commit_id = ?1 \
         ORDER BY julianday(started_at), rowid",
    )?;
    let mut sessions: Vec<Session> = stmt
        .query_map(params![commit.id], |row| {
            Ok(Session {
                id: row.get(0)?,
                started_at: row.get(1)?,
                ended_at: row.get(2)?,
                turns: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for session in &mut sessions {
        session.turns = turns_for_session(conn, &session.id)?;
    }

    commit.turn_count = Some(sessions.iter().map(|s| s.turns.len()).sum());
    commit.sessions = sessions;
    Ok(())
}

/// Turns of one session in timestamp order.
pub fn turns_for_session(conn: &Connection, session_id: &str) -> Result<Vec<Turn>> {
    let mut stmt = conn.prepare(
        "SELECT id, role, content, timestamp, tool_calls, triggers_visual, model \
         FROM turns WHERE session_id = ?1 ORDER BY julianday(timestamp), rowid",
    )?;
    let turns = stmt
        .query_map(params![session_id], row_to_turn)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to load turns for session {session_id}"))?;
    Ok(turns)
}

fn row_to_commit(row: &Row) -> rusqlite::Result<CognitiveCommit> {
    let closed_by: String = row.get(4)?;
    let source: String = row.get(10)?;
    let files_read: String = row.get(6)?;
    let files_changed: String = row.get(7)?;

    Ok(CognitiveCommit {
        id: row.get(0)?,
        git_hash: row.get(1)?,
        started_at: row.get(2)?,
        closed_at: row.get(3)?,
        closed_by: closed_by.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
        parallel: row.get(5)?,
        files_read: serde_json::from_str(&files_read).unwrap_or_default(),
        files_changed: serde_json::from_str(&files_changed).unwrap_or_default(),
        title: row.get(8)?,
        project_name: row.get(9)?,
        source: source.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
        hidden: row.get(11)?,
        sessions: Vec::new(),
        turn_count: None,
    })
}

fn row_to_turn(row: &Row) -> rusqlite::Result<Turn> {
    let role: String = row.get(1)?;
    let tool_calls: Option<String> = row.get(4)?;
    let triggers_visual: bool = row.get(5)?;

    Ok(Turn {
        id: row.get(0)?,
        role: role.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
        content: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        timestamp: row.get(3)?,
        tool_calls: tool_calls.and_then(|s| serde_json::from_str::<Vec<ToolCall>>(&s).ok()),
        triggers_visual_update: triggers_visual.then_some(true),
        model: row.get(6)?,
    })
}

/// Escape `%`, `_`, and `\` so user text matches literally in a LIKE pattern
/// using `ESCAPE '\'`.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::types::{ClosedBy, ConversationSource, Role};
    use crate::db::open_memory_database;

    fn turn(id: &str, role: Role, content: &str, ts: &str) -> Turn {
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

    fn commit(id: &str, project: &str, closed_at: &str, turns: Vec<Turn>) -> CognitiveCommit {
        CognitiveCommit {
            id: id.into(),
            git_hash: None,
            started_at: closed_at.into(),
            closed_at: closed_at.into(),
            closed_by: ClosedBy::SessionEnd,
            parallel: false,
            files_read: vec![],
            files_changed: vec!["src/lib.rs".into()],
            title: None,
            project_name: Some(project.into()),
            source: ConversationSource::ClaudeCode,
            hidden: false,
            sessions: vec![Session {
                id: format!("{id}-s"),
                started_at: closed_at.into(),
                ended_at: closed_at.into(),
                turns,
            }],
            turn_count: None,
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let mut conn = open_memory_database().unwrap();
        let c = commit(
            "commit-aaaa-1",
            "demo",
            "2025-01-15T11:00:00Z",
            vec![
                turn("t2", Role::Assistant, "done", "2025-01-15T10:05:00Z"),
                turn("t1", Role::User, "please fix it", "2025-01-15T10:00:00Z"),
            ],
        );
        insert_commit(&mut conn, &c).unwrap();

        let loaded = get_commit(&conn, "commit-aaaa-1").unwrap().unwrap();
        assert_eq!(loaded.title.as_deref(), Some("please fix it"));
        assert_eq!(loaded.turn_count, Some(2));
        assert_eq!(loaded.files_changed, vec!["src/lib.rs".to_string()]);
        // ordered by timestamp regardless of insertion order
        assert_eq!(loaded.sessions[0].turns[0].id, "t1");
    }

    #[test]
    fn get_commit_by_prefix() {
        let mut conn = open_memory_database().unwrap();
        insert_commit(&mut conn, &commit("abcdef123", "p", "2025-01-01T00:00:00Z", vec![])).unwrap();
        assert!(get_commit(&conn, "abcd").unwrap().is_some());
        assert!(get_commit(&conn, "abc").unwrap().is_none());
        assert!(get_commit(&conn, "zzzz").unwrap().is_none());
    }

    #[test]
    fn ambiguous_prefix_is_an_error() {
        let mut conn = open_memory_database().unwrap();
        insert_commit(&mut conn, &commit("abcd-1", "p", "2025-01-01T00:00:00Z", vec![])).unwrap();
        insert_commit(&mut conn, &commit("abcd-2", "p", "2025-01-02T00:00:00Z", vec![])).unwrap();
        assert!(get_commit(&conn, "abcd").is_err());
    }

    #[test]
    fn reinsert_replaces_turns() {
        let mut conn = open_memory_database().unwrap();
        let mut c = commit(
            "c1",
            "p",
            "2025-01-01T00:00:00Z",
            vec![turn("old", Role::User, "first", "2025-01-01T00:00:00Z")],
        );
        insert_commit(&mut conn, &c).unwrap();
        c.sessions[0].turns = vec![turn("new", Role::User, "second", "2025-01-01T00:00:00Z")];
        insert_commit(&mut conn, &c).unwrap();

        let loaded = get_commit(&conn, "c1").unwrap().unwrap();
        assert_eq!(loaded.total_turns(), 1);
        assert_eq!(loaded.sessions[0].turns[0].id, "new");
    }

    #[test]
    fn list_orders_newest_first_and_filters() {
        let mut conn = open_memory_database().unwrap();
        insert_commit(&mut conn, &commit("a", "alpha", "2025-01-01T00:00:00Z", vec![])).unwrap();
        insert_commit(&mut conn, &commit("b", "beta", "2025-01-03T00:00:00Z", vec![])).unwrap();
        insert_commit(&mut conn, &commit("c", "alpha", "2025-01-02T00:00:00Z", vec![])).unwrap();

        let all = list_commits(&conn, &CommitFilter::default()).unwrap();
        let ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);

        let alpha = list_commits(
            &conn,
            &CommitFilter {
                project: Some("alpha".into()),
                limit: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(alpha.len(), 1);
        assert_eq!(alpha[0].id, "c");

        let projects = list_projects(&conn).unwrap();
        assert_eq!(projects[0], ProjectCount { name: "alpha".into(), count: 2 });
    }

    #[test]
    fn hidden_commits_are_excluded_by_default() {
        let mut conn = open_memory_database().unwrap();
        insert_commit(&mut conn, &commit("a", "p", "2025-01-01T00:00:00Z", vec![])).unwrap();
        update_commit(&conn, "a", &CommitPatch { title: None, hidden: Some(true) }).unwrap();

        assert!(list_commits(&conn, &CommitFilter::default()).unwrap().is_empty());
        let with_hidden = CommitFilter { include_hidden: true, ..Default::default() };
        assert_eq!(list_commits(&conn, &with_hidden).unwrap().len(), 1);
    }

    #[test]
    fn update_title_and_clear() {
        let mut conn = open_memory_database().unwrap();
        insert_commit(&mut conn, &commit("a", "p", "2025-01-01T00:00:00Z", vec![])).unwrap();

        let patch = CommitPatch { title: Some("  Renamed ".into()), hidden: None };
        let updated = update_commit(&conn, "a", &patch).unwrap().unwrap();
        assert_eq!(updated.title.as_deref(), Some("Renamed"));

        let cleared = update_commit(&conn, "a", &CommitPatch { title: Some("".into()), hidden: None })
            .unwrap()
            .unwrap();
        assert_eq!(cleared.title, None);

        assert!(update_commit(&conn, "missing", &CommitPatch::default()).unwrap().is_none());
    }

    #[test]
    fn delete_cascades_to_turns() {
        let mut conn = open_memory_database().unwrap();
        insert_commit(
            &mut conn,
            &commit(
                "a",
                "p",
                "2025-01-01T00:00:00Z",
                vec![turn("t1", Role::User, "hi", "2025-01-01T00:00:00Z")],
            ),
        )
        .unwrap();

        assert!(delete_commit(&conn, "a").unwrap());
        assert!(!delete_commit(&conn, "a").unwrap());

        let turns: i64 = conn.query_row("SELECT COUNT(*) FROM turns", [], |r| r.get(0)).unwrap();
        let sessions: i64 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0)).unwrap();
        assert_eq!(turns, 0);
        assert_eq!(sessions, 0);
    }

    #[test]
    fn commits_before_respects_project() {
        let mut conn = open_memory_database().unwrap();
        insert_commit(&mut conn, &commit("old-a", "a", "2024-01-01T00:00:00Z", vec![])).unwrap();
        insert_commit(&mut conn, &commit("old-b", "b", "2024-02-01T00:00:00Z", vec![])).unwrap();
        insert_commit(&mut conn, &commit("new-a", "a", "2025-06-01T00:00:00Z", vec![])).unwrap();

        let all = commits_before(&conn, "2025-01-01T00:00:00Z", None).unwrap();
        assert_eq!(all.len(), 2);
        let only_a = commits_before(&conn, "2025-01-01T00:00:00Z", Some("a")).unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].id, "old-a");
    }

    #[test]
    fn displayable_rules() {
        let empty = commit("a", "p", "2025-01-01T00:00:00Z", vec![]);
        assert!(!is_displayable(&empty));

        let warmup = commit(
            "b",
            "p",
            "2025-01-01T00:00:00Z",
            vec![turn("t", Role::User, "Warmup", "2025-01-01T00:00:00Z")],
        );
        assert!(!is_displayable(&warmup));

        let real = commit(
            "c",
            "p",
            "2025-01-01T00:00:00Z",
            vec![turn("t", Role::User, "add a cache", "2025-01-01T00:00:00Z")],
        );
        assert!(is_displayable(&real));
    }

    #[test]
    fn tool_calls_survive_storage() {
        let mut conn = open_memory_database().unwrap();
        let mut t = turn("t1", Role::Assistant, "", "2025-01-01T00:00:00Z");
        t.tool_calls = Some(vec![ToolCall {
            id: "tc1".into(),
            name: "Read".into(),
            input: serde_json::json!({"file_path": "src/main.rs"}),
            result: Some("fn main() {}".into()),
            is_error: None,
        }]);
        insert_commit(&mut conn, &commit("a", "p", "2025-01-01T00:00:00Z", vec![t])).unwrap();

        let loaded = get_commit(&conn, "a").unwrap().unwrap();
        let calls = loaded.sessions[0].turns[0].tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input_str("file_path"), Some("src/main.rs"));
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
