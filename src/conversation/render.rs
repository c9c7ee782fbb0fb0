//! Conversation → display items.
//!
//! [`build_render_items`] flattens a commit's sessions into a single timeline.
//! Runs of consecutive tool-only assistant turns collapse into one
//! [`RenderItem::ToolGroup`]; everything else stays a [`RenderItem::Turn`].
//! Each item carries the gap since the previous turn so views can draw
//! "2h later" dividers, and turn items carry a search-match flag so views can
//! step between hits by item index.

use serde::Serialize;

use super::format::gap_minutes;
use crate::commit::search::contains_ignore_case;
use crate::commit::types::{CognitiveCommit, Role, ToolCall, Turn};

/// Gaps longer than this many minutes get a divider.
pub const GAP_DIVIDER_MINUTES: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum RenderItem<'a> {
    Turn {
        turn: &'a Turn,
        gap_minutes: Option<f64>,
        is_match: bool,
    },
    ToolGroup {
        turns: Vec<&'a Turn>,
        /// Gap before the first turn of the group.
        gap_minutes: Option<f64>,
    },
}

impl RenderItem<'_> {
    pub fn gap_minutes(&self) -> Option<f64> {
        match self {
            Self::Turn { gap_minutes, .. } | Self::ToolGroup { gap_minutes, .. } => *gap_minutes,
        }
    }

    /// Whether a time-gap divider should precede this item.
    pub fn shows_gap_divider(&self) -> bool {
        self.gap_minutes().is_some_and(|g| g > GAP_DIVIDER_MINUTES)
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Turn { is_match: true, .. })
    }
}

/// A tool call flattened out of a tool group, tagged with its owning turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedToolCall<'a> {
    #[serde(flatten)]
    pub call: &'a ToolCall,
    pub turn_id: &'a str,
}

/// An assistant turn with no text, only tool calls.
pub fn is_tool_only_turn(turn: &Turn) -> bool {
    turn.role == Role::Assistant && turn.content.trim().is_empty() && !turn.tool_calls().is_empty()
}

/// Build the display timeline for a commit.
///
/// `search_term` marks turn items whose content contains it (ignoring case);
/// tool groups never match. An empty term matches nothing.
pub fn build_render_items<'a>(
    commit: &'a CognitiveCommit,
    search_term: Option<&str>,
) -> Vec<RenderItem<'a>> {
    let term = search_term.filter(|t| !t.is_empty());
    let mut items = Vec::new();
    let mut prev_timestamp: Option<&str> = None;
    let mut group: Vec<&Turn> = Vec::new();
    let mut group_gap: Option<f64> = None;

    for turn in commit.turns() {
        let gap = prev_timestamp.and_then(|prev| gap_minutes(prev, &turn.timestamp));

        if is_tool_only_turn(turn) {
            if group.is_empty() {
                group_gap = gap;
            }
            group.push(turn);
        } else {
            flush_group(&mut items, &mut group, &mut group_gap);
            let is_match = term.is_some_and(|t| contains_ignore_case(&turn.content, t));
            items.push(RenderItem::Turn {
                turn,
                gap_minutes: gap,
                is_match,
            });
        }

        prev_timestamp = Some(turn.timestamp.as_str());
    }

    flush_group(&mut items, &mut group, &mut group_gap);
    items
}

fn flush_group<'a>(
    items: &mut Vec<RenderItem<'a>>,
    group: &mut Vec<&'a Turn>,
    group_gap: &mut Option<f64>,
) {
    if group.is_empty() {
        return;
    }
    items.push(RenderItem::ToolGroup {
        turns: std::mem::take(group),
        gap_minutes: group_gap.take(),
    });
}

/// Indices of items that matched the search term.
pub fn match_indices(items: &[RenderItem<'_>]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_match())
        .map(|(idx, _)| idx)
        .collect()
}

/// All tool calls of a group in order.
pub fn flatten_tool_calls<'a>(turns: &[&'a Turn]) -> Vec<GroupedToolCall<'a>> {
    turns
        .iter()
        .flat_map(|&turn| {
            turn.tool_calls().iter().map(move |call| GroupedToolCall {
                call,
                turn_id: turn.id.as_str(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::types::{ClosedBy, ConversationSource, Session};

    fn turn(id: &str, role: Role, content: &str, ts: &str, tools: usize) -> Turn {
        let tool_calls = (tools > 0).then(|| {
            (0..tools)
                .map(|i| ToolCall {
                    id: format!("{id}-tc{i}"),
                    name: "Read".into(),
                    input: serde_json::json!({"file_path": "a.rs"}),
                    result: None,
                    is_error: None,
                })
                .collect()
        });
        Turn {
            id: id.into(),
            role,
            content: content.into(),
            timestamp: ts.into(),
            model: None,
            tool_calls,
            triggers_visual_update: None,
        }
    }

    fn commit(sessions: Vec<Vec<Turn>>) -> CognitiveCommit {
        CognitiveCommit {
            id: "c".into(),
            git_hash: None,
            started_at: "2025-01-15T10:00:00Z".into(),
            closed_at: "2025-01-15T14:00:00Z".into(),
            closed_by: ClosedBy::SessionEnd,
            parallel: false,
            files_read: vec![],
            files_changed: vec![],
            title: None,
            project_name: None,
            source: ConversationSource::ClaudeCode,
            hidden: false,
            sessions: sessions
                .into_iter()
                .enumerate()
                .map(|(i, turns)| Session {
                    id: format!("s{i}"),
                    started_at: String::new(),
                    ended_at: String::new(),
                    turns,
                })
                .collect(),
            turn_count: None,
        }
    }

    #[test]
    fn tool_only_detection() {
        assert!(is_tool_only_turn(&turn("a", Role::Assistant, "  ", "t", 1)));
        assert!(!is_tool_only_turn(&turn("a", Role::Assistant, "text", "t", 1)));
        assert!(!is_tool_only_turn(&turn("a", Role::Assistant, "", "t", 0)));
        assert!(!is_tool_only_turn(&turn("a", Role::User, "", "t", 1)));
    }

    #[test]
    fn groups_consecutive_tool_only_turns() {
        let c = commit(vec![vec![
            turn("u1", Role::User, "read the files", "2025-01-15T10:00:00Z", 0),
            turn("a1", Role::Assistant, "", "2025-01-15T10:01:00Z", 2),
            turn("a2", Role::Assistant, "", "2025-01-15T10:02:00Z", 1),
            turn("a3", Role::Assistant, "Done reading", "2025-01-15T10:03:00Z", 0),
            turn("a4", Role::Assistant, "", "2025-01-15T10:04:00Z", 1),
        ]]);

        let items = build_render_items(&c, None);
        assert_eq!(items.len(), 4);

        assert!(matches!(items[0], RenderItem::Turn { gap_minutes: None, .. }));
        match &items[1] {
            RenderItem::ToolGroup { turns, gap_minutes } => {
                assert_eq!(turns.len(), 2);
                assert_eq!(*gap_minutes, Some(1.0));
                assert_eq!(flatten_tool_calls(turns).len(), 3);
            }
            other => panic!("expected tool group, got {other:?}"),
        }
        assert!(matches!(items[2], RenderItem::Turn { .. }));
        // trailing group is flushed
        assert!(matches!(items[3], RenderItem::ToolGroup { .. }));
    }

    #[test]
    fn groups_span_session_boundaries_and_gaps_carry_over() {
        let c = commit(vec![
            vec![turn("u1", Role::User, "start", "2025-01-15T10:00:00Z", 0)],
            vec![turn("u2", Role::User, "back again", "2025-01-15T12:30:00Z", 0)],
        ]);
        let items = build_render_items(&c, None);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].gap_minutes(), Some(150.0));
        assert!(items[1].shows_gap_divider());
        assert!(!items[0].shows_gap_divider());
    }

    #[test]
    fn search_marks_matching_turns_only() {
        let c = commit(vec![vec![
            turn("u1", Role::User, "Fix the PARSER", "2025-01-15T10:00:00Z", 0),
            turn("a1", Role::Assistant, "", "2025-01-15T10:01:00Z", 1),
            turn("a2", Role::Assistant, "parser fixed", "2025-01-15T10:02:00Z", 0),
            turn("u2", Role::User, "thanks", "2025-01-15T10:03:00Z", 0),
        ]]);

        let items = build_render_items(&c, Some("parser"));
        assert_eq!(match_indices(&items), vec![0, 2]);

        let none = build_render_items(&c, Some(""));
        assert!(match_indices(&none).is_empty());
    }

    #[test]
    fn empty_commit_has_no_items() {
        let c = commit(vec![]);
        assert!(build_render_items(&c, None).is_empty());
    }

    #[test]
    fn serializes_with_type_tags() {
        let c = commit(vec![vec![
            turn("u1", Role::User, "hi", "2025-01-15T10:00:00Z", 0),
            turn("a1", Role::Assistant, "", "2025-01-15T10:01:00Z", 1),
        ]]);
        let json = serde_json::to_value(build_render_items(&c, None)).unwrap();
        assert_eq!(json[0]["type"], "turn");
        assert_eq!(json[0]["isMatch"], false);
        assert_eq!(json[1]["type"], "tool-group");
        assert_eq!(json[1]["gapMinutes"], 1.0);
    }
}
