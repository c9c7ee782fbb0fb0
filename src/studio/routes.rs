//! JSON handlers behind `/api`.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::commit::search::{extract_snippet, search_turns, SearchFilter, SearchResult, SNIPPET_CHARS};
use crate::commit::stats::{commit_stats, CommitStats};
use crate::commit::store::{self, CommitFilter, CommitPatch};
use crate::commit::types::CognitiveCommit;
use crate::conversation::export::{export_filename, format_commit_markdown, format_commit_plain_text};
use crate::conversation::format::project_color_index;
use crate::conversation::render::{build_render_items, match_indices};
use crate::conversation::title::{extract_first_user_message, generate_title_preview};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub project: Option<String>,
    #[serde(default)]
    pub include_hidden: bool,
    pub limit: Option<usize>,
}

/// List entry: commit metadata without conversation bodies.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitCard {
    #[serde(flatten)]
    pub commit: CognitiveCommit,
    pub title_preview: String,
    pub project_color: Option<usize>,
}

impl CommitCard {
    fn from_commit(mut commit: CognitiveCommit) -> Self {
        let title_preview = match commit.title {
            Some(ref title) => title.clone(),
            None => generate_title_preview(extract_first_user_message(&commit)),
        };
        let project_color = commit.project_name.as_deref().map(project_color_index);
        commit.turn_count = Some(commit.total_turns());
        commit.sessions.clear();
        Self {
            commit,
            title_preview,
            project_color,
        }
    }
}

pub async fn list_commits(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let conn = state.db()?;
    let filter = CommitFilter {
        project: params.project,
        include_hidden: params.include_hidden,
        limit: None,
    };
    let commits: Vec<CommitCard> = store::list_commits(&conn, &filter)?
        .into_iter()
        .filter(store::is_displayable)
        .take(params.limit.unwrap_or(usize::MAX))
        .map(CommitCard::from_commit)
        .collect();
    let projects = store::list_projects(&conn)?;

    Ok(Json(json!({
        "commits": commits,
        "total": commits.len(),
        "projects": projects,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DetailParams {
    pub search: Option<String>,
}

/// Load by exact id.
fn load_commit(conn: &rusqlite::Connection, id: &str) -> ApiResult<CognitiveCommit> {
    if !store::commit_exists(conn, id)? {
        return Err(ApiError::NotFound(format!("commit {id}")));
    }
    store::get_commit(conn, id)?.ok_or_else(|| ApiError::NotFound(format!("commit {id}")))
}

pub async fn get_commit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DetailParams>,
) -> ApiResult<Json<Value>> {
    let conn = state.db()?;
    let commit = load_commit(&conn, &id)?;
    let items = build_render_items(&commit, params.search.as_deref());
    let matches = match_indices(&items);

    Ok(Json(json!({
        "commit": commit,
        "items": items,
        "matches": matches,
    })))
}

pub async fn update_commit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CommitPatch>,
) -> ApiResult<Json<CognitiveCommit>> {
    if patch.title.is_none() && patch.hidden.is_none() {
        return Err(ApiError::BadRequest("nothing to update".into()));
    }
    let conn = state.db()?;
    load_commit(&conn, &id)?;
    let updated = store::update_commit(&conn, &id, &patch)?
        .ok_or_else(|| ApiError::NotFound(format!("commit {id}")))?;
    tracing::info!(id = %id, "commit updated");
    Ok(Json(updated))
}

pub async fn delete_commit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let conn = state.db()?;
    if !store::delete_commit(&conn, &id)? {
        return Err(ApiError::NotFound(format!("commit {id}")));
    }
    tracing::info!(id = %id, "commit deleted");
    Ok(Json(json!({ "deleted": true, "id": id })))
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

pub async fn export_commit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ExportParams>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.db()?;
    let commit = load_commit(&conn, &id)?;

    let (body, content_type, ext) = match params.format.as_deref().unwrap_or("markdown") {
        "markdown" | "md" => (
            format_commit_markdown(&commit),
            "text/markdown; charset=utf-8",
            "md",
        ),
        "text" | "txt" => (
            format_commit_plain_text(&commit),
            "text/plain; charset=utf-8",
            "txt",
        ),
        other => {
            return Err(ApiError::BadRequest(format!(
                "unknown export format '{other}' (expected markdown or text)"
            )))
        }
    };

    // Header values must be visible ASCII.
    let filename: String = export_filename(&commit, ext)
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect();
    let disposition = format!("attachment; filename=\"{filename}\"");

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub project: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub result: SearchResult,
    pub snippet: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Value>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query parameter 'q' is required".into()));
    }

    let mut filter = SearchFilter {
        project: params.project,
        ..Default::default()
    };
    if let Some(limit) = params.limit {
        filter.limit = limit;
    }

    let conn = state.db()?;
    let hits: Vec<SearchHit> = search_turns(&conn, query, &filter)?
        .into_iter()
        .map(|result| SearchHit {
            snippet: extract_snippet(&result.content, query, SNIPPET_CHARS),
            result,
        })
        .collect();

    Ok(Json(json!({ "query": query, "results": hits })))
}

#[derive(Debug, Deserialize)]
pub struct ProjectParams {
    pub project: Option<String>,
}

pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<ProjectParams>,
) -> ApiResult<Json<CommitStats>> {
    let conn = state.db()?;
    Ok(Json(commit_stats(&conn, params.project.as_deref())?))
}

pub async fn projects(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let conn = state.db()?;
    let projects = store::list_projects(&conn)?;
    Ok(Json(json!({ "projects": projects })))
}
