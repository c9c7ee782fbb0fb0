use anyhow::{Context, Result};
use std::path::Path;

use cogcommit::commit::store::{self, CommitFilter};
use cogcommit::config::CogCommitConfig;
use cogcommit::conversation::export::format_commits_markdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

/// Export commits, newest first, to stdout or a file. JSON output can be
/// imported again with `cogcommit import --source json`.
pub fn export(
    config: &CogCommitConfig,
    format: ExportFormat,
    output: Option<&Path>,
    project: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    let conn = cogcommit::db::open_database(config.resolved_db_path())?;

    let filter = CommitFilter {
        project: project.map(str::to_string),
        include_hidden: true,
        limit,
    };
    let commits = store::list_commits(&conn, &filter)?;

    let rendered = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&commits)?,
        ExportFormat::Markdown => format_commits_markdown(&commits),
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} commits to {}", commits.len(), path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
