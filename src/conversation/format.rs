//! Display formatting shared by the CLI, the studio API, and exports.

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};

use crate::commit::types::{ClosedBy, ConversationSource, ToolCall};

/// Number of palette slots a project name can hash into.
pub const PROJECT_PALETTE_SIZE: usize = 8;

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Absolute gap between two timestamps in (fractional) minutes.
pub fn gap_minutes(a: &str, b: &str) -> Option<f64> {
    let (a, b) = (parse_timestamp(a)?, parse_timestamp(b)?);
    Some((b - a).num_milliseconds().unsigned_abs() as f64 / 60_000.0)
}

/// Human-readable duration: `"12 min"`, `"2h 5m"`, `"3h"`, `"1d 4h"`, `"2d"`.
pub fn format_gap(minutes: f64) -> String {
    if minutes < 60.0 {
        return format!("{} min", minutes.round() as i64);
    }
    let hours = (minutes / 60.0).floor() as i64;
    let mins = (minutes % 60.0).round() as i64;
    if hours < 24 {
        return if mins > 0 {
            format!("{hours}h {mins}m")
        } else {
            format!("{hours}h")
        };
    }
    let days = hours / 24;
    let remaining = hours % 24;
    if remaining > 0 {
        format!("{days}d {remaining}h")
    } else {
        format!("{days}d")
    }
}

/// Short display name for a model identifier.
pub fn format_model_name(model: Option<&str>) -> String {
    let Some(model) = model.filter(|m| !m.is_empty()) else {
        return "Agent".to_string();
    };
    let label = if model.contains("opus-4-5") {
        "Opus 4.5"
    } else if model.contains("opus-4") {
        "Opus 4"
    } else if model.contains("opus") {
        "Opus"
    } else if model.contains("sonnet-4") {
        "Sonnet 4"
    } else if model.contains("3-5-sonnet") || model.contains("3.5-sonnet") {
        "Sonnet 3.5"
    } else if model.contains("sonnet") {
        "Sonnet"
    } else if model.contains("haiku") {
        "Haiku"
    } else {
        return model
            .rsplit('-')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("Agent")
            .to_string();
    };
    label.to_string()
}

/// `"just now"`, `"5m ago"`, `"3h ago"`, `"yesterday"`, `"4d ago"`; a week
/// or more falls back to [`format_time`] so the date stays visible.
pub fn format_relative_time(ts: &str, now: DateTime<Utc>) -> String {
    format_relative_time_in(ts, now, &Local)
}

pub fn format_relative_time_in<Tz: TimeZone>(ts: &str, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(date) = parse_timestamp(ts) else {
        return ts.to_string();
    };
    let diff_mins = (now - date).num_minutes();
    let diff_hours = diff_mins.div_euclid(60);
    let diff_days = diff_hours.div_euclid(24);

    if diff_mins < 1 {
        "just now".to_string()
    } else if diff_mins < 60 {
        format!("{diff_mins}m ago")
    } else if diff_hours < 24 {
        format!("{diff_hours}h ago")
    } else if diff_days == 1 {
        "yesterday".to_string()
    } else if diff_days < 7 {
        format!("{diff_days}d ago")
    } else {
        format_time_in(ts, tz)
    }
}

/// `"Jan 15, 2:30 PM"` in local time, as shown on commit cards.
pub fn format_time(ts: &str) -> String {
    format_time_in(ts, &Local)
}

pub fn format_time_in<Tz: TimeZone>(ts: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(ts) {
        Some(dt) => dt.with_timezone(tz).format("%b %-d, %-I:%M %p").to_string(),
        None => ts.to_string(),
    }
}

/// `"Wed, Jan 15, 2025 2:30:05 PM"` in local time, for exports and tooltips.
pub fn format_absolute_time(ts: &str) -> String {
    format_absolute_time_in(ts, &Local)
}

pub fn format_absolute_time_in<Tz: TimeZone>(ts: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(ts) {
        Some(dt) => dt
            .with_timezone(tz)
            .format("%a, %b %-d, %Y %-I:%M:%S %p")
            .to_string(),
        None => ts.to_string(),
    }
}

/// Time span of a commit. Arguments may be given in either order.
///
/// Same day: `"Jan 15, 2025 2:30 PM – 4:45 PM (2h 15m)"`.
/// Different days: `"Jan 15, 2:30 PM – Jan 16, 10:00 AM (19h 30m)"`.
pub fn format_time_range(started_at: &str, closed_at: &str) -> String {
    format_time_range_in(started_at, closed_at, &Local)
}

pub fn format_time_range_in<Tz: TimeZone>(started_at: &str, closed_at: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let (Some(t1), Some(t2)) = (parse_timestamp(started_at), parse_timestamp(closed_at)) else {
        return format!("{started_at} – {closed_at}");
    };
    let (start, end) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    let duration = format_gap((end - start).num_minutes() as f64);

    let start = start.with_timezone(tz);
    let end = end.with_timezone(tz);
    let same_day = start.year() == end.year()
        && start.month() == end.month()
        && start.day() == end.day();

    if same_day {
        format!(
            "{} – {} ({duration})",
            start.format("%b %-d, %Y %-I:%M %p"),
            end.format("%-I:%M %p"),
        )
    } else {
        format!(
            "{} – {} ({duration})",
            start.format("%b %-d, %-I:%M %p"),
            end.format("%b %-d, %-I:%M %p"),
        )
    }
}

/// Render a JSON value the way string interpolation would: bare strings,
/// everything else as compact JSON.
fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Detailed tool input for expanded views.
pub fn format_tool_input(input: &serde_json::Value) -> String {
    for (key, label) in [("command", "command"), ("file_path", "file"), ("pattern", "pattern")] {
        if let Some(value) = input.get(key) {
            return format!("{label}: {}", display_value(value));
        }
    }
    serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string())
}

/// One-line hover summary for a tool call.
pub fn tool_summary(call: &ToolCall) -> String {
    let input = &call.input;
    if let Some(path) = input.get("file_path") {
        return display_value(path);
    }
    if let Some(cmd) = input.get("command") {
        return truncate_chars(&display_value(cmd), 60);
    }
    if let Some(pattern) = input.get("pattern") {
        return format!("pattern: {}", display_value(pattern));
    }
    if let Some(query) = input.get("query") {
        return format!("query: {}", display_value(query));
    }
    if let Some(url) = input.get("url") {
        return display_value(url);
    }
    if call.failed() {
        return "Error".to_string();
    }
    call.name.clone()
}

/// Keep the first `max` characters, appending `...` when anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

pub fn source_label(source: ConversationSource) -> &'static str {
    match source {
        ConversationSource::ClaudeCode => "Claude",
        ConversationSource::Cursor => "Cursor",
        ConversationSource::Antigravity => "Antigravity",
        ConversationSource::Codex => "Codex",
        ConversationSource::Opencode => "OpenCode",
    }
}

pub fn closure_label(closed_by: ClosedBy) -> &'static str {
    match closed_by {
        ClosedBy::GitCommit => "committed",
        ClosedBy::SessionEnd => "session ended",
        ClosedBy::Explicit => "closed",
    }
}

/// Stable palette slot for a project badge.
pub fn project_color_index(name: &str) -> usize {
    let mut hash: i32 = 0;
    for unit in name.encode_utf16() {
        hash = (unit as i32).wrapping_add((hash << 5).wrapping_sub(hash));
    }
    hash.unsigned_abs() as usize % PROJECT_PALETTE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_formatting() {
        assert_eq!(format_gap(0.4), "0 min");
        assert_eq!(format_gap(45.0), "45 min");
        assert_eq!(format_gap(60.0), "1h");
        assert_eq!(format_gap(135.0), "2h 15m");
        assert_eq!(format_gap(24.0 * 60.0), "1d");
        assert_eq!(format_gap(27.0 * 60.0 + 10.0), "1d 3h");
    }

    #[test]
    fn gap_minutes_is_absolute() {
        let a = "2025-01-15T10:00:00Z";
        let b = "2025-01-15T10:30:00Z";
        assert_eq!(gap_minutes(a, b), Some(30.0));
        assert_eq!(gap_minutes(b, a), Some(30.0));
        assert_eq!(gap_minutes(a, "not a date"), None);
    }

    #[test]
    fn model_names() {
        assert_eq!(format_model_name(None), "Agent");
        assert_eq!(format_model_name(Some("claude-opus-4-5-20251101")), "Opus 4.5");
        assert_eq!(format_model_name(Some("claude-opus-4-20250514")), "Opus 4");
        assert_eq!(format_model_name(Some("claude-sonnet-4-20250514")), "Sonnet 4");
        assert_eq!(format_model_name(Some("claude-3-5-sonnet-20241022")), "Sonnet 3.5");
        assert_eq!(format_model_name(Some("claude-3-haiku")), "Haiku");
        assert_eq!(format_model_name(Some("gpt-4o")), "4o");
    }

    #[test]
    fn relative_time_buckets() {
        let now = parse_timestamp("2025-01-15T12:00:00Z").unwrap();
        assert_eq!(format_relative_time("2025-01-15T11:59:30Z", now), "just now");
        assert_eq!(format_relative_time("2025-01-15T11:15:00Z", now), "45m ago");
        assert_eq!(format_relative_time("2025-01-15T09:00:00Z", now), "3h ago");
        assert_eq!(format_relative_time("2025-01-14T10:00:00Z", now), "yesterday");
        assert_eq!(format_relative_time("2025-01-11T12:00:00Z", now), "4d ago");
        assert_eq!(
            format_relative_time_in("2025-01-07T14:30:00Z", now, &Utc),
            "Jan 7, 2:30 PM"
        );
    }

    #[test]
    fn time_range_same_day_and_spanning() {
        let same = format_time_range_in("2025-01-15T16:45:00Z", "2025-01-15T14:30:00Z", &Utc);
        assert_eq!(same, "Jan 15, 2025 2:30 PM – 4:45 PM (2h 15m)");

        let span = format_time_range_in("2025-01-15T14:30:00Z", "2025-01-16T10:00:00Z", &Utc);
        assert_eq!(span, "Jan 15, 2:30 PM – Jan 16, 10:00 AM (19h 30m)");
    }

    #[test]
    fn tool_input_and_summary() {
        let call = ToolCall {
            id: "1".into(),
            name: "Bash".into(),
            input: serde_json::json!({"command": "x".repeat(70)}),
            result: None,
            is_error: None,
        };
        assert_eq!(tool_summary(&call), format!("{}...", "x".repeat(60)));
        assert!(format_tool_input(&call.input).starts_with("command: xxx"));

        let failed = ToolCall {
            id: "2".into(),
            name: "Task".into(),
            input: serde_json::json!({}),
            result: None,
            is_error: Some(true),
        };
        assert_eq!(tool_summary(&failed), "Error");

        let grep = serde_json::json!({"pattern": "fn main"});
        assert_eq!(format_tool_input(&grep), "pattern: fn main");
    }

    #[test]
    fn project_color_is_stable() {
        let a = project_color_index("cogcommit");
        assert_eq!(a, project_color_index("cogcommit"));
        assert!(a < PROJECT_PALETTE_SIZE);
        assert_eq!(project_color_index(""), 0);
    }

    #[test]
    fn labels() {
        assert_eq!(source_label(ConversationSource::Opencode), "OpenCode");
        assert_eq!(closure_label(ClosedBy::GitCommit), "committed");
    }
}
