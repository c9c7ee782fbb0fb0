use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::BTreeMap;

use super::store::ProjectCount;

/// Aggregate counts over stored commits.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStats {
    pub total_commits: u64,
    pub total_sessions: u64,
    pub total_turns: u64,
    pub project_count: u64,
    pub by_source: BTreeMap<String, u64>,
    pub top_projects: Vec<ProjectCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit: Option<String>,
}

/// Compute commit statistics, optionally restricted to one project.
pub fn commit_stats(conn: &Connection, project: Option<&str>) -> Result<CommitStats> {
    let (total_commits, project_count, first, last): (i64, i64, Option<String>, Option<String>) =
        conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT project_name), MIN(closed_at), MAX(closed_at) \
             FROM cognitive_commits WHERE (?1 IS NULL OR project_name = ?1)",
            params![project],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

    let total_sessions: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sessions s JOIN cognitive_commits c ON s.commit_id = c.id \
         WHERE (?1 IS NULL OR c.project_name = ?1)",
        params![project],
        |row| row.get(0),
    )?;

    let total_turns: i64 = conn.query_row(
        "SELECT COUNT(*) FROM turns t \
         JOIN sessions s ON t.session_id = s.id \
         JOIN cognitive_commits c ON s.commit_id = c.id \
         WHERE (?1 IS NULL OR c.project_name = ?1)",
        params![project],
        |row| row.get(0),
    )?;

    let mut by_source = BTreeMap::new();
    let mut stmt = conn.prepare(
        "SELECT source, COUNT(*) FROM cognitive_commits \
         WHERE (?1 IS NULL OR project_name = ?1) GROUP BY source",
    )?;
    let rows: Vec<(String, i64)> = stmt
        .query_map(params![project], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    for (source, count) in rows {
        by_source.insert(source, count as u64);
    }

    let mut stmt = conn.prepare(
        "SELECT project_name, COUNT(*) AS n FROM cognitive_commits \
         WHERE project_name IS NOT NULL AND (?1 IS NULL OR project_name = ?1) \
         GROUP BY project_name ORDER BY n DESC, project_name LIMIT 10",
    )?;
    let top_projects = stmt
        .query_map(params![project], |row| {
            Ok(ProjectCount {
                name: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CommitStats {
        total_commits: total_commits as u64,
        total_sessions: total_sessions as u64,
        total_turns: total_turns as u64,
        project_count: project_count as u64,
        by_source,
        top_projects,
        first_commit: first,
        last_commit: last,
    })
}
