use anyhow::{Context, Result};

use cogcommit::commit::store;
use cogcommit::commit::types::{CognitiveCommit, Role, ToolCall, Turn};
use cogcommit::config::CogCommitConfig;
use cogcommit::conversation::export::format_commit_markdown;
use cogcommit::conversation::format::{
    closure_label, format_gap, format_model_name, format_time, format_time_range, source_label,
    tool_summary,
};
use cogcommit::conversation::render::{build_render_items, flatten_tool_calls, RenderItem};

use super::{BOLD, CYAN, DIM, RESET, YELLOW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShowFormat {
    Text,
    Markdown,
    Json,
}

/// Print a single commit. `id` may be an unambiguous prefix.
pub fn show(config: &CogCommitConfig, id: &str, format: ShowFormat) -> Result<()> {
    let conn = cogcommit::db::open_database(config.resolved_db_path())?;
    let commit = store::get_commit(&conn, id)?.with_context(|| format!("commit not found: {id}"))?;

    match format {
        ShowFormat::Json => println!("{}", serde_json::to_string_pretty(&commit)?),
        ShowFormat::Markdown => println!("{}", format_commit_markdown(&commit)),
        ShowFormat::Text => print_conversation(&commit),
    }
    Ok(())
}

fn print_conversation(commit: &CognitiveCommit) {
    println!("{BOLD}{}{RESET}", commit.title.as_deref().unwrap_or("Untitled"));
    println!(
        "{DIM}{}  {}  {}  {}{RESET}",
        commit.id,
        commit.project_name.as_deref().unwrap_or("-"),
        source_label(commit.source),
        format_time_range(&commit.started_at, &commit.closed_at),
    );
    match commit.git_hash {
        Some(ref hash) => println!("{DIM}{} {YELLOW}{hash}{RESET}", closure_label(commit.closed_by)),
        None => println!("{DIM}{}{RESET}", closure_label(commit.closed_by)),
    }
    if !commit.files_changed.is_empty() {
        println!("{DIM}Files changed: {}{RESET}", commit.files_changed.join(", "));
    }
    println!();

    for item in build_render_items(commit, None) {
        if item.shows_gap_divider() {
            if let Some(gap) = item.gap_minutes() {
                println!("{DIM}──────── {} ────────{RESET}\n", format_gap(gap));
            }
        }
        match item {
            RenderItem::Turn { turn, .. } => print_turn(turn),
            RenderItem::ToolGroup { turns, .. } => {
                let calls = flatten_tool_calls(&turns);
                println!("{DIM}  ⚙ {} tool call(s){RESET}", calls.len());
                for grouped in calls {
                    let marker = if grouped.call.failed() { "✗" } else { "·" };
                    println!("{DIM}    {marker} {}{RESET}", tool_line(grouped.call));
                }
                println!();
            }
        }
    }
}

fn print_turn(turn: &Turn) {
    match turn.role {
        Role::User => println!("{CYAN}{BOLD}You{RESET} {DIM}{}{RESET}", format_time(&turn.timestamp)),
        Role::Assistant => println!(
            "{BOLD}{}{RESET} {DIM}{}{RESET}",
            format_model_name(turn.model.as_deref()),
            format_time(&turn.timestamp)
        ),
    }
    if !turn.content.trim().is_empty() {
        println!("{}", turn.content.trim_end());
    }
    for call in turn.tool_calls() {
        println!("{DIM}  ⚙ {}{RESET}", tool_line(call));
    }
    println!();
}

fn tool_line(call: &ToolCall) -> String {
    let summary = tool_summary(call);
    if summary == call.name {
        summary
    } else {
        format!("{} {summary}", call.name)
    }
}
