//! The task entity: identity, lifecycle, schedule, and rendering.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::recurrence::Recurrence;

/// Maximum number of trailing `!` markers that count toward priority.
pub const MAX_PRIORITY_MARKERS: u8 = 3;

const SLUG_MAX_WORDS: usize = 4;

/// One task: all persisted fields.
///
/// `id` is immutable once assigned. `display_text` is derived from the
/// other fields and recomputed on every mutation; `text` is the source of
/// truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u64,
    pub slug: String,
    pub text: String,
    pub display_text: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TodoItem {
    /// Create a pending task with a pre-deduplicated slug.
    ///
    /// Slug derivation and collision handling live in the manager, which
    /// can see the whole collection.
    #[must_use]
    pub fn new(
        id: u64,
        slug: String,
        text: &str,
        due: Option<NaiveDate>,
        recurrence: Option<Recurrence>,
        created: DateTime<Utc>,
    ) -> Self {
        let mut item = Self {
            id,
            slug,
            text: text.trim().to_string(),
            display_text: String::new(),
            done: false,
            notes: None,
            recurrence,
            due,
            created,
            completed_at: None,
        };
        item.refresh_display_text();
        item
    }

    /// Number of trailing `!` priority markers in the text, capped at
    /// [`MAX_PRIORITY_MARKERS`].
    #[must_use]
    pub fn priority(&self) -> u8 {
        priority_markers(&self.text)
    }

    /// Recompute `display_text` from the current fields.
    pub fn refresh_display_text(&mut self) {
        self.display_text =
            render_display_text(&self.text, self.due, self.recurrence.as_ref());
    }
}

/// Count trailing `!` markers, capped at [`MAX_PRIORITY_MARKERS`].
#[must_use]
pub fn priority_markers(text: &str) -> u8 {
    let trailing = text
        .trim_end()
        .chars()
        .rev()
        .take_while(|&c| c == '!')
        .count();
    u8::try_from(trailing)
        .unwrap_or(MAX_PRIORITY_MARKERS)
        .min(MAX_PRIORITY_MARKERS)
}

/// Derive a short kebab-case slug from task text.
///
/// Lowercases, keeps alphanumeric runs, and joins the first few words
/// with dashes. Priority markers and punctuation do not contribute.
/// Returns `"task"` for text with no usable words.
#[must_use]
pub fn derive_slug(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .take(SLUG_MAX_WORDS)
        .map(str::to_lowercase)
        .collect();

    if words.is_empty() {
        "task".to_string()
    } else {
        words.join("-")
    }
}

fn render_display_text(
    text: &str,
    due: Option<NaiveDate>,
    recurrence: Option<&Recurrence>,
) -> String {
    let base = text.trim_end_matches(['!', ' ']).trim_end();
    let mut rendered = if base.is_empty() {
        text.trim().to_string()
    } else {
        base.to_string()
    };

    let mut meta = Vec::new();
    if let Some(due) = due {
        meta.push(format!("due {due}"));
    }
    if let Some(rule) = recurrence {
        meta.push(rule.to_string());
    }
    if !meta.is_empty() {
        rendered.push_str(&format!(" ({})", meta.join(", ")));
    }

    let bangs = priority_markers(text);
    if bangs > 0 {
        rendered.push_str(&format!(" [{}]", "!".repeat(usize::from(bangs))));
    }

    rendered
}

#[cfg(test)]
mod tests {
    use super::{TodoItem, derive_slug, priority_markers};
    use crate::model::recurrence::{Recurrence, Unit};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn created() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn derive_slug_uses_leading_words() {
        assert_eq!(derive_slug("Fix the login bug"), "fix-the-login-bug");
        assert_eq!(
            derive_slug("Write Q3 report for finance team"),
            "write-q3-report-for"
        );
        assert_eq!(derive_slug("pay rent!!"), "pay-rent");
        assert_eq!(derive_slug("!!!"), "task");
    }

    #[test]
    fn priority_markers_counts_trailing_bangs() {
        assert_eq!(priority_markers("ship release"), 0);
        assert_eq!(priority_markers("ship release!"), 1);
        assert_eq!(priority_markers("ship release!! "), 2);
        assert_eq!(priority_markers("ship release!!!!!"), 3);
        // Interior bangs are part of the text, not markers.
        assert_eq!(priority_markers("don't panic! just ship"), 0);
    }

    #[test]
    fn display_text_includes_due_and_recurrence() {
        let item = TodoItem::new(
            1,
            "pay-rent".to_string(),
            "Pay rent!",
            NaiveDate::from_ymd_opt(2024, 3, 1),
            Some(Recurrence {
                interval: 1,
                unit: Unit::Month,
            }),
            created(),
        );
        assert_eq!(
            item.display_text,
            "Pay rent (due 2024-03-01, every month) [!]"
        );
        assert_eq!(item.priority(), 1);
    }

    #[test]
    fn display_text_is_plain_for_bare_tasks() {
        let item = TodoItem::new(
            2,
            "water-plants".to_string(),
            "water plants",
            None,
            None,
            created(),
        );
        assert_eq!(item.display_text, "water plants");
        assert_eq!(item.priority(), 0);
    }

    #[test]
    fn refresh_display_text_tracks_mutation() {
        let mut item = TodoItem::new(
            3,
            "call-dentist".to_string(),
            "call dentist",
            None,
            None,
            created(),
        );
        item.due = NaiveDate::from_ymd_opt(2024, 5, 2);
        item.refresh_display_text();
        assert_eq!(item.display_text, "call dentist (due 2024-05-02)");
    }

    #[test]
    fn json_roundtrip_preserves_all_fields() {
        let item = TodoItem::new(
            7,
            "standup-notes".to_string(),
            "standup notes!!",
            NaiveDate::from_ymd_opt(2024, 2, 5),
            Some(Recurrence {
                interval: 1,
                unit: Unit::Weekday,
            }),
            created(),
        );
        let encoded = serde_json::to_string(&item).unwrap();
        let decoded: TodoItem = serde_json::from_str(&encoded).unwrap();
        assert_eq!(item, decoded);
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let raw = r#"{
            "id": 4,
            "slug": "old-task",
            "text": "old task",
            "display_text": "old task",
            "done": false,
            "created": "2024-01-01T09:00:00Z"
        }"#;
        let item: TodoItem = serde_json::from_str(raw).unwrap();
        assert!(item.notes.is_none());
        assert!(item.recurrence.is_none());
        assert!(item.due.is_none());
        assert!(item.completed_at.is_none());
    }
}
