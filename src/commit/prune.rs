//! Age-based deletion of commits.

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rusqlite::Connection;
use serde::Serialize;

use super::store::{commits_before, delete_commit};

/// Number of commits listed in a dry-run preview.
pub const PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct PrunePreview {
    pub id: String,
    pub project_name: Option<String>,
    pub closed_at: String,
}

#[derive(Debug, Serialize)]
pub struct PruneResult {
    pub matched: usize,
    pub deleted: usize,
    pub preview: Vec<PrunePreview>,
}

/// Parse a `--before` argument into an RFC 3339 cutoff.
///
/// Accepts relative ages (`30d`, `2w`, `3m` where a month is 30 days), an
/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as midnight UTC.
pub fn parse_before(input: &str, now: DateTime<Utc>) -> Result<String> {
    let input = input.trim();

    if is_relative(input) {
        let Some(cutoff) = parse_relative_days(input)
            .and_then(Duration::try_days)
            .and_then(|age| now.checked_sub_signed(age))
        else {
            bail!("age '{input}' is too large");
        };
        return Ok(cutoff.to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::Millis, true));
        }
    }

    bail!("invalid date '{input}': use a relative age like 30d, 2w, 3m or a date like 2024-01-01")
}

/// Digits followed by a `d`, `w`, or `m` unit.
fn is_relative(input: &str) -> bool {
    match input.char_indices().last() {
        Some((idx, unit)) if matches!(unit, 'd' | 'w' | 'm') => {
            let digits = &input[..idx];
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

/// Age in days, or `None` when it does not fit in an `i64`.
fn parse_relative_days(input: &str) -> Option<i64> {
    let (digits, unit) = input.split_at(input.len() - 1);
    let multiplier = match unit {
        "d" => 1,
        "w" => 7,
        "m" => 30,
        _ => return None,
    };
    digits.parse::<i64>().ok()?.checked_mul(multiplier)
}

/// Delete commits closed before `before`. With `dry_run` nothing is removed
/// and only the match count and preview are returned.
pub fn prune_commits(
    conn: &Connection,
    before: &str,
    project: Option<&str>,
    dry_run: bool,
) -> Result<PruneResult> {
    let commits = commits_before(conn, before, project)?;

    let preview = commits
        .iter()
        .take(PREVIEW_LIMIT)
        .map(|c| PrunePreview {
            id: c.id.clone(),
            project_name: c.project_name.clone(),
            closed_at: c.closed_at.clone(),
        })
        .collect();

    let mut deleted = 0;
    if !dry_run {
        for commit in &commits {
            if delete_commit(conn, &commit.id)? {
                deleted += 1;
            }
        }
        tracing::info!(before, deleted, "pruned commits");
    }

    Ok(PruneResult {
        matched: commits.len(),
        deleted,
        preview,
    })
}
