//! Cognitive commits for AI-assisted coding.
//!
//! CogCommit turns AI coding-assistant transcripts into *cognitive commits*:
//! the stretch of conversation that led up to a git commit (or to the end of
//! a session). Commits are stored locally in SQLite and can be browsed,
//! searched, exported, pruned, served to a local studio, and synced to a
//! hosted dashboard.
//!
//! | Concept | Meaning |
//! |---------|---------|
//! | **Commit** | One unit of work, closed by `git commit`, session end, or explicitly |
//! | **Session** | A bounded run of turns inside a commit |
//! | **Turn** | One user or assistant message, possibly with tool calls |
//! | **Render item** | A turn, or a collapsed run of tool-only assistant turns |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database initialization, schema, migrations, and health checks
//! - [`commit`]: Commit types, storage, search, statistics, and pruning
//! - [`conversation`]: Render grouping, display formatting, titles, and exports
//! - [`parser`]: Claude Code JSONL and JSON export parsers
//! - [`studio`]: Local JSON API (axum)
//! - [`sync`]: Push/pull against the hosted Supabase backend

pub mod commit;
pub mod config;
pub mod conversation;
pub mod db;
pub mod parser;
pub mod studio;
pub mod sync;
