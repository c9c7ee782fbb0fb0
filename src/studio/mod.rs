//! Local studio API.
//!
//! A small axum server exposing the commit store as JSON under `/api`. It
//! shares a single SQLite connection behind a mutex; every handler does its
//! database work synchronously while holding the lock.

pub mod error;
pub mod routes;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::CogCommitConfig;
use crate::db;
use error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    fn db(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("database lock poisoned")))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/commits", get(routes::list_commits))
        .route(
            "/api/commits/{id}",
            get(routes::get_commit)
                .patch(routes::update_commit)
                .delete(routes::delete_commit),
        )
        .route("/api/commits/{id}/export", get(routes::export_commit))
        .route("/api/search", get(routes::search))
        .route("/api/stats", get(routes::stats))
        .route("/api/projects", get(routes::projects))
        .with_state(state)
}

/// Open the configured database and serve the studio API until ctrl-c.
pub async fn serve(config: &CogCommitConfig, host: &str, port: u16) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let app = router(AppState::new(conn));
    let bind_addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "studio listening");
    println!("CogCommit studio running at http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down studio");
        })
        .await?;

    Ok(())
}
