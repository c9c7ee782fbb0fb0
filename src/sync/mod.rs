//! Push/pull sync with the hosted dashboard backend.
//!
//! Push uploads every commit whose local `sync_status` is `pending` or
//! `conflict` (new imports and local edits), parent rows first, then marks
//! them synced. Pull downloads the user's non-deleted commits and stores them
//! locally as synced. A remote commit is never written over a local one with
//! unpushed edits. Such a commit is flagged `conflict` and keeps that flag
//! until the next push sends it.

pub mod client;
pub mod transforms;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

use crate::commit::store;
use crate::commit::types::SyncStatus;
pub use client::{SupabaseClient, SyncError};
use transforms::{
    to_db_commit, to_db_session, to_db_turn, transform_commit_with_relations,
    DbCommitWithRelations,
};

#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub pushed: usize,
    pub pulled: usize,
    pub conflicts: usize,
}

/// Upload pending and conflicting commits, optionally limited to one project.
pub async fn push(
    conn: &Connection,
    client: &SupabaseClient,
    project: Option<&str>,
) -> Result<SyncReport> {
    let pending = store::pending_sync(conn, project)?;
    if pending.is_empty() {
        return Ok(SyncReport::default());
    }

    let user_id = client.user_id().await.context("failed to resolve user")?;
    tracing::info!(commits = pending.len(), "pushing commits");

    let commits: Vec<_> = pending.iter().map(|c| to_db_commit(c, &user_id)).collect();
    let sessions: Vec<_> = pending
        .iter()
        .flat_map(|c| c.sessions.iter().map(|s| to_db_session(s, &c.id, &user_id)))
        .collect();
    let turns: Vec<_> = pending
        .iter()
        .flat_map(|c| c.sessions.iter())
        .flat_map(|s| s.turns.iter().map(|t| to_db_turn(t, &s.id, &user_id)))
        .collect();

    client.upsert("cognitive_commits", &commits).await?;
    client.upsert("sessions", &sessions).await?;
    client.upsert("turns", &turns).await?;

    for commit in &pending {
        store::mark_synced(conn, &commit.id)?;
    }

    Ok(SyncReport {
        pushed: pending.len(),
        ..Default::default()
    })
}

/// Download remote commits, optionally limited to one project.
pub async fn pull(
    conn: &mut Connection,
    client: &SupabaseClient,
    project: Option<&str>,
) -> Result<SyncReport> {
    let mut query = vec![
        ("select", "*,sessions(*,turns(*))".to_string()),
        ("deleted_at", "is.null".to_string()),
        ("order", "closed_at.desc".to_string()),
    ];
    if let Some(project) = project {
        query.push(("project_name", format!("eq.{project}")));
    }

    let rows: Vec<DbCommitWithRelations> = client.select("cognitive_commits", &query).await?;
    tracing::info!(commits = rows.len(), "pulled commits");

    let mut report = SyncReport::default();
    for row in rows {
        let commit = transform_commit_with_relations(row);
        match store::sync_status(conn, &commit.id)? {
            Some(SyncStatus::Pending) => {
                tracing::warn!(id = %commit.id, "local edits not pushed; keeping local copy");
                store::set_sync_status(conn, &commit.id, SyncStatus::Conflict)?;
                report.conflicts += 1;
                continue;
            }
            // Already flagged by an earlier pull; stays local until pushed.
            Some(SyncStatus::Conflict) => {
                report.conflicts += 1;
                continue;
            }
            _ => {}
        }
        store::insert_commit_with_status(conn, &commit, SyncStatus::Synced)?;
        store::mark_synced(conn, &commit.id)?;
        report.pulled += 1;
    }

    Ok(report)
}
