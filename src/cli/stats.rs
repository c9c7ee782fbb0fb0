use anyhow::Result;

use cogcommit::commit::stats::commit_stats;
use cogcommit::config::CogCommitConfig;
use cogcommit::conversation::format::format_absolute_time;

/// Display commit statistics in the terminal, or as JSON.
pub fn stats(config: &CogCommitConfig, project: Option<&str>, json: bool) -> Result<()> {
    let conn = cogcommit::db::open_database(config.resolved_db_path())?;
    let response = commit_stats(&conn, project)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match project {
        Some(p) => println!("Commit Statistics ({p})"),
        None => println!("Commit Statistics"),
    }
    println!("{}", "=".repeat(40));
    println!("  Commits:             {}", response.total_commits);
    println!("  Sessions:            {}", response.total_sessions);
    println!("  Turns:               {}", response.total_turns);
    println!("  Projects:            {}", response.project_count);
    println!();

    if !response.by_source.is_empty() {
        println!("By Source:");
        for (source, count) in &response.by_source {
            println!("  {:<14} {}", source, count);
        }
        println!();
    }

    if !response.top_projects.is_empty() {
        println!("Top Projects:");
        for p in &response.top_projects {
            println!("  {:<24} {}", p.name, p.count);
        }
        println!();
    }

    if let Some(ref first) = response.first_commit {
        println!("First commit:          {}", format_absolute_time(first));
    }
    if let Some(ref last) = response.last_commit {
        println!("Last commit:           {}", format_absolute_time(last));
    }

    Ok(())
}
