mod helpers;

use cogcommit::commit::store::{self, CommitFilter};
use cogcommit::commit::types::ClosedBy;
use cogcommit::conversation::export::{format_commit_markdown, format_commits_markdown};
use cogcommit::conversation::render::{build_render_items, RenderItem};
use cogcommit::parser::{claude_code, parse_export};
use helpers::test_db;

const SESSION_LOG: &str = r#"{"type":"user","uuid":"0193a1b2-0001","timestamp":"2025-02-01T09:00:00Z","sessionId":"sess-1","cwd":"/work/api-server","message":{"role":"user","content":"Rate-limit the login endpoint"}}
{"type":"assistant","uuid":"0193a1b2-0002","timestamp":"2025-02-01T09:00:10Z","sessionId":"sess-1","message":{"role":"assistant","model":"claude-sonnet-4-20250514","content":[{"type":"tool_use","id":"tu1","name":"Read","input":{"file_path":"src/auth.rs"}}]}}
{"type":"assistant","uuid":"0193a1b2-0003","timestamp":"2025-02-01T09:00:20Z","sessionId":"sess-1","message":{"role":"assistant","model":"claude-sonnet-4-20250514","content":[{"type":"tool_use","id":"tu2","name":"Edit","input":{"file_path":"src/auth.rs","old_string":"a","new_string":"b"}}]}}
{"type":"user","uuid":"0193a1b2-0004","timestamp":"2025-02-01T09:00:21Z","sessionId":"sess-1","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"tu1","content":"pub fn login() {}"},{"type":"tool_result","tool_use_id":"tu2","content":"ok"}]}}
{"type":"assistant","uuid":"0193a1b2-0005","timestamp":"2025-02-01T09:01:00Z","sessionId":"sess-1","message":{"role":"assistant","content":[{"type":"text","text":"Added a token bucket. Committing."},{"type":"tool_use","id":"tu3","name":"Bash","input":{"command":"git commit -am 'Rate-limit login'"}}]}}
{"type":"user","uuid":"0193a1b2-0006","timestamp":"2025-02-01T09:01:02Z","sessionId":"sess-1","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"tu3","content":"[main 9f8e7d6] Rate-limit login"}]}}
{"type":"user","uuid":"0193a1b2-0007","timestamp":"2025-02-01T11:30:00Z","sessionId":"sess-1","message":{"role":"user","content":"Also log rejected attempts"}}
{"type":"assistant","uuid":"0193a1b2-0008","timestamp":"2025-02-01T11:31:00Z","sessionId":"sess-1","message":{"role":"assistant","content":"Logged."}}
"#;

fn write_log(dir: &std::path::Path) -> std::path::PathBuf {
    let project = dir.join("-work-api-server");
    std::fs::create_dir_all(&project).unwrap();
    let path = project.join("sess-1.jsonl");
    std::fs::write(&path, SESSION_LOG).unwrap();
    path
}

#[test]
fn claude_log_imports_as_two_commits() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());

    let files = claude_code::discover_sessions(dir.path()).unwrap();
    assert_eq!(files.len(), 1);
    let parsed = claude_code::parse_session_file(&files[0]).unwrap();
    assert_eq!(parsed.skipped_lines, 0);

    let mut conn = test_db();
    for commit in &parsed.commits {
        store::insert_commit(&mut conn, commit).unwrap();
    }

    let commits = store::list_commits(&conn, &CommitFilter::default()).unwrap();
    assert_eq!(commits.len(), 2);

    // newest first
    let follow_up = &commits[0];
    let first = &commits[1];

    assert_eq!(first.closed_by, ClosedBy::GitCommit);
    assert_eq!(first.git_hash.as_deref(), Some("9f8e7d6"));
    assert_eq!(first.project_name.as_deref(), Some("api-server"));
    assert_eq!(first.title.as_deref(), Some("Rate-limit the login endpoint"));
    assert_eq!(first.files_changed, vec!["src/auth.rs"]);
    assert_eq!(first.total_turns(), 4);

    let edit = first.sessions[0].turns[2].tool_calls()[0].clone();
    assert_eq!(edit.name, "Edit");
    assert_eq!(edit.result.as_deref(), Some("ok"));

    assert_eq!(follow_up.closed_by, ClosedBy::SessionEnd);
    assert_eq!(follow_up.title.as_deref(), Some("Also log rejected attempts"));

    // the two tool-only turns collapse into one group
    let items = build_render_items(first, None);
    assert_eq!(items.len(), 3);
    assert!(matches!(&items[1], RenderItem::ToolGroup { turns, .. } if turns.len() == 2));
}

#[test]
fn reparsing_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(dir.path());

    let a = claude_code::parse_session_file(&path).unwrap();
    let b = claude_code::parse_session_file(&path).unwrap();
    let ids_a: Vec<_> = a.commits.iter().map(|c| c.id.clone()).collect();
    let ids_b: Vec<_> = b.commits.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids_a, ids_b);
}

#[test]
fn json_export_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(dir.path());
    let parsed = claude_code::parse_session_file(&path).unwrap();

    let mut source = test_db();
    for commit in &parsed.commits {
        store::insert_commit(&mut source, commit).unwrap();
    }
    let exported = store::list_commits(&source, &CommitFilter::default()).unwrap();
    let json = serde_json::to_string_pretty(&exported).unwrap();

    let mut target = test_db();
    for commit in parse_export(&json).unwrap() {
        store::insert_commit(&mut target, &commit).unwrap();
    }
    let reimported = store::list_commits(&target, &CommitFilter::default()).unwrap();

    assert_eq!(reimported, exported);
}

#[test]
fn markdown_exports_mention_every_commit() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(dir.path());
    let parsed = claude_code::parse_session_file(&path).unwrap();

    let bulk = format_commits_markdown(&parsed.commits);
    assert_eq!(bulk.matches("\n## ").count(), 2);
    assert!(bulk.contains("- **Git Hash**: 9f8e7d6"));

    let single = format_commit_markdown(&parsed.commits[0]);
    assert!(single.contains("**Git:** `9f8e7d6`"));
    assert!(single.contains("- `Edit` (src/auth.rs)"));
}
