use anyhow::Result;
use chrono::Utc;

use cogcommit::commit::search::{
    extract_snippet, highlight_matches, search_turns, SearchFilter, SNIPPET_CHARS,
};
use cogcommit::commit::types::short_id;
use cogcommit::config::CogCommitConfig;
use cogcommit::conversation::format::format_relative_time;

use super::{CYAN, DIM, RESET, YELLOW};

/// Search turn content and print highlighted snippets.
pub fn search(
    config: &CogCommitConfig,
    query: &str,
    project: Option<&str>,
    limit: usize,
) -> Result<()> {
    let conn = cogcommit::db::open_database(config.resolved_db_path())?;

    let filter = SearchFilter {
        project: project.map(str::to_string),
        limit,
    };
    let results = search_turns(&conn, query, &filter)?;

    if results.is_empty() {
        println!("No results found for \"{query}\"");
        return Ok(());
    }

    println!("Found {} result(s) for \"{query}\"\n", results.len());

    let now = Utc::now();
    for result in &results {
        println!(
            "{CYAN}{}{RESET} {DIM}{} · {} · {}{RESET}",
            result.project_name.as_deref().unwrap_or("-"),
            short_id(&result.commit_id),
            result.role,
            format_relative_time(&result.timestamp, now),
        );
        let snippet = extract_snippet(&result.content, query, SNIPPET_CHARS);
        println!("  {}\n", highlight_matches(&snippet, query, YELLOW, RESET));
    }

    Ok(())
}
