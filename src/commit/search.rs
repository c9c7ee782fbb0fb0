//! Substring search over turn content, plus snippet and highlight helpers.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

use super::store::escape_like;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Width of the context window (split on both sides of a match) in snippets.
pub const SNIPPET_CHARS: usize = 100;

/// A turn matching a search query, with enough context to locate it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
    pub session_id: String,
    pub commit_id: String,
    pub project_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchFilter {
    pub project: Option<String>,
    pub limit: usize,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            project: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Case-insensitive (ASCII) substring search over turn content, newest first.
/// `%` and `_` in the query match literally.
pub fn search_turns(
    conn: &Connection,
    query: &str,
    filter: &SearchFilter,
) -> Result<Vec<SearchResult>> {
    let pattern = format!("%{}%", escape_like(query));

    let mut stmt = conn.prepare(
        "SELECT t.id, t.role, t.content, t.timestamp, s.id, c.id, c.project_name \
         FROM turns t \
         JOIN sessions s ON t.session_id = s.id \
         JOIN cognitive_commits c ON s.commit_id = c.id \
         WHERE t.content LIKE ?1 ESCAPE '\\' \
           AND (?2 IS NULL OR c.project_name = ?2) \
         ORDER BY julianday(t.timestamp) DESC \
         LIMIT ?3",
    )?;

    let results = stmt
        .query_map(
            params![pattern, filter.project, filter.limit as i64],
            |row| {
                Ok(SearchResult {
                    id: row.get(0)?,
                    role: row.get(1)?,
                    content: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    timestamp: row.get(3)?,
                    session_id: row.get(4)?,
                    commit_id: row.get(5)?,
                    project_name: row.get(6)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(query, matches = results.len(), "searched turns");
    Ok(results)
}

/// Character offsets of every non-overlapping case-insensitive occurrence of
/// `needle` in `haystack`.
fn find_matches(haystack: &[char], needle: &[char]) -> Vec<usize> {
    let mut found = Vec::new();
    if needle.is_empty() || needle.len() > haystack.len() {
        return found;
    }
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        let hit = haystack[i..i + needle.len()]
            .iter()
            .zip(needle)
            .all(|(a, b)| chars_eq_ignore_case(*a, *b));
        if hit {
            found.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    found
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Whether `content` contains `query`, ignoring case.
pub fn contains_ignore_case(content: &str, query: &str) -> bool {
    let hay: Vec<char> = content.chars().collect();
    let needle: Vec<char> = query.chars().collect();
    !find_matches(&hay, &needle).is_empty()
}

/// Excerpt of `content` around the first match of `query`.
///
/// Keeps `chars / 2` characters on each side of the match and marks cut
/// edges with `...`. Without a match, returns the first `chars * 2`
/// characters.
pub fn extract_snippet(content: &str, query: &str, chars: usize) -> String {
    let hay: Vec<char> = content.chars().collect();
    let needle: Vec<char> = query.chars().collect();

    let Some(&index) = find_matches(&hay, &needle).first() else {
        let head: String = hay.iter().take(chars * 2).collect();
        return if hay.len() > chars * 2 {
            format!("{head}...")
        } else {
            head
        };
    };

    let half = chars / 2;
    let start = index.saturating_sub(half);
    let end = (index + needle.len() + half).min(hay.len());

    let mut snippet: String = hay[start..end].iter().collect();
    if start > 0 {
        snippet = format!("...{snippet}");
    }
    if end < hay.len() {
        snippet.push_str("...");
    }
    snippet
}

/// Wrap every case-insensitive occurrence of `query` in `open`/`close`,
/// preserving the original casing of the matched text.
pub fn highlight_matches(text: &str, query: &str, open: &str, close: &str) -> String {
    let hay: Vec<char> = text.chars().collect();
    let needle: Vec<char> = query.chars().collect();
    let matches = find_matches(&hay, &needle);
    if matches.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + matches.len() * (open.len() + close.len()));
    let mut cursor = 0;
    for start in matches {
        out.extend(&hay[cursor..start]);
        out.push_str(open);
        out.extend(&hay[start..start + needle.len()]);
        out.push_str(close);
        cursor = start + needle.len();
    }
    out.extend(&hay[cursor..]);
    out
}
