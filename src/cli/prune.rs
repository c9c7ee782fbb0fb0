use anyhow::{Context, Result};
use chrono::Utc;
use std::io::{BufRead, Write};

use cogcommit::commit::prune::{parse_before, prune_commits, PREVIEW_LIMIT};
use cogcommit::commit::types::short_id;
use cogcommit::config::CogCommitConfig;
use cogcommit::conversation::format::format_absolute_time;

/// Delete commits closed before `before`. Asks for a typed `yes` unless
/// `yes` is set.
pub fn prune(
    config: &CogCommitConfig,
    before: &str,
    project: Option<&str>,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let cutoff = parse_before(before, Utc::now())?;
    let conn = cogcommit::db::open_database(config.resolved_db_path())?;

    let preview = prune_commits(&conn, &cutoff, project, true)?;
    if preview.matched == 0 {
        println!("No commits found matching criteria.");
        return Ok(());
    }

    println!("Found {} commits to prune.", preview.matched);

    if dry_run {
        println!("\nDry run - would delete:");
        for c in &preview.preview {
            println!(
                "  {} - {} - {}",
                short_id(&c.id),
                c.project_name.as_deref().unwrap_or("unknown"),
                format_absolute_time(&c.closed_at)
            );
        }
        if preview.matched > PREVIEW_LIMIT {
            println!("  ... and {} more", preview.matched - PREVIEW_LIMIT);
        }
        return Ok(());
    }

    if !yes && !confirm(&format!("Delete {} commits? Type 'yes' to confirm: ", preview.matched))? {
        println!("Aborted.");
        return Ok(());
    }

    let result = prune_commits(&conn, &cutoff, project, false)?;
    println!("Deleted {} commits.", result.deleted);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
