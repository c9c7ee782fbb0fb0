use anyhow::Result;
use chrono::Utc;

use cogcommit::commit::store::{self, CommitFilter};
use cogcommit::config::CogCommitConfig;
use cogcommit::conversation::format::format_relative_time;
use cogcommit::conversation::title::{extract_first_user_message, generate_title_preview};

use super::{CYAN, DIM, RESET};

/// Print commits newest first. Without `all`, hidden, empty and warmup
/// commits are left out.
pub fn list(
    config: &CogCommitConfig,
    project: Option<&str>,
    limit: usize,
    all: bool,
) -> Result<()> {
    let conn = cogcommit::db::open_database(config.resolved_db_path())?;

    let filter = CommitFilter {
        project: project.map(str::to_string),
        include_hidden: all,
        limit: None,
    };
    let commits: Vec<_> = store::list_commits(&conn, &filter)?
        .into_iter()
        .filter(|c| all || store::is_displayable(c))
        .take(limit)
        .collect();

    if commits.is_empty() {
        println!("No commits found.");
        return Ok(());
    }

    let now = Utc::now();
    for commit in &commits {
        let title = match commit.title {
            Some(ref t) => t.clone(),
            None => generate_title_preview(extract_first_user_message(commit)),
        };
        let hidden = if commit.hidden { " [hidden]" } else { "" };
        println!(
            "{DIM}{}{RESET}  {:<14}  {CYAN}{:<16}{RESET}  {}{} {DIM}({} turns){RESET}",
            commit.short_id(),
            format_relative_time(&commit.closed_at, now),
            commit.project_name.as_deref().unwrap_or("-"),
            title,
            hidden,
            commit.total_turns(),
        );
    }

    Ok(())
}
