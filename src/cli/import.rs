use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use cogcommit::commit::store::{self, ImportOutcome};
use cogcommit::commit::types::CognitiveCommit;
use cogcommit::config::CogCommitConfig;
use cogcommit::parser::{self, claude_code, ImportSource};

#[derive(Debug, Default)]
struct ImportTally {
    files: u64,
    failed_files: u64,
    imported: u64,
    updated: u64,
    unchanged: u64,
    skipped_lines: u64,
}

/// Import conversation logs or a JSON export.
///
/// `path` defaults to the configured Claude Code projects directory. A `.json`
/// file (or `--source json`) is read as a CogCommit export; anything else is
/// scanned for `*.jsonl` session logs. Files that fail to parse are reported
/// and skipped.
pub fn import(
    config: &CogCommitConfig,
    path: Option<&Path>,
    source: Option<ImportSource>,
) -> Result<()> {
    let root = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.resolved_claude_projects_dir());
    anyhow::ensure!(root.exists(), "import path not found: {}", root.display());

    let source = source.unwrap_or_else(|| {
        if root.extension().is_some_and(|ext| ext == "json") {
            ImportSource::Json
        } else {
            ImportSource::ClaudeCode
        }
    });

    let files = collect_files(&root, source)?;
    if files.is_empty() {
        println!("No conversation logs found under {}", root.display());
        return Ok(());
    }

    let db_path = config.resolved_db_path();
    let mut conn = cogcommit::db::open_database(&db_path)?;

    println!("Importing {} file(s) from {}...", files.len(), root.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut tally = ImportTally::default();
    for file in &files {
        pb.set_message(
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let parsed = match source {
            ImportSource::Json => std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))
                .and_then(|json| parser::parse_export(&json))
                .map(|commits| (commits, 0)),
            ImportSource::ClaudeCode => claude_code::parse_session_file(file)
                .map(|log| (log.commits, log.skipped_lines)),
        };

        match parsed {
            Ok((commits, skipped_lines)) => {
                tally.skipped_lines += skipped_lines as u64;
                for commit in &commits {
                    store_commit(&mut conn, commit, &mut tally)?;
                }
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "skipping unreadable file");
                tally.failed_files += 1;
            }
        }

        tally.files += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("Import complete:");
    println!("  Files processed:   {}", tally.files);
    println!("  Commits imported:  {}", tally.imported);
    println!("  Commits updated:   {}", tally.updated);
    println!("  Unchanged:         {}", tally.unchanged);
    if tally.skipped_lines > 0 {
        println!("  Malformed lines:   {}", tally.skipped_lines);
    }
    if tally.failed_files > 0 {
        println!("  Failed files:      {}", tally.failed_files);
    }

    Ok(())
}

fn store_commit(
    conn: &mut Connection,
    commit: &CognitiveCommit,
    tally: &mut ImportTally,
) -> Result<()> {
    match store::import_commit(conn, commit)? {
        ImportOutcome::Inserted => tally.imported += 1,
        ImportOutcome::Updated => tally.updated += 1,
        ImportOutcome::Unchanged => tally.unchanged += 1,
    }
    Ok(())
}

fn collect_files(root: &Path, source: ImportSource) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    match source {
        ImportSource::ClaudeCode => claude_code::discover_sessions(root),
        ImportSource::Json => {
            let mut files: Vec<PathBuf> = std::fs::read_dir(root)
                .with_context(|| format!("failed to read directory: {}", root.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            files.sort();
            Ok(files)
        }
    }
}
