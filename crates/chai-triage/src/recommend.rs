//! Ranked, explained recommendations over the pending snapshot.

use chai_core::manager::TodoManager;
use chai_core::model::todo::TodoItem;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::score::{
    SignalInputs, SignalWeights, due_component, priority_component, signal_score,
    wait_component,
};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One recommended task, its score, and why it ranked.
///
/// `reason` is computed from the same inputs as `score`, so the ranking
/// stays auditable.
#[derive(Debug, Clone)]
pub struct ScoredTask<'a> {
    pub item: &'a TodoItem,
    pub score: f64,
    pub reason: String,
}

/// An immutable, ordered recommendation snapshot.
///
/// Returned to and held by the caller; entries are addressed by 1-based
/// index (the way a session presents them). The core keeps no
/// recommendation state of its own.
#[derive(Debug, Clone, Default)]
pub struct Recommendations<'a> {
    entries: Vec<ScoredTask<'a>>,
}

impl<'a> Recommendations<'a> {
    /// Entry by 1-based display index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ScoredTask<'a>> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredTask<'a>> {
        self.entries.iter()
    }
}

impl<'a, 'b> IntoIterator for &'b Recommendations<'a> {
    type Item = &'b ScoredTask<'a>;
    type IntoIter = std::slice::Iter<'b, ScoredTask<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Rank the pending tasks and return the top `count`.
///
/// Pure over `(pending snapshot, now)`: identical inputs yield identical
/// ordered output. Ties keep stable input order. Returns fewer than
/// `count` entries when fewer pending tasks exist, and an empty snapshot
/// (not an error) when there are none.
#[must_use]
pub fn get_recommendations<'a>(
    manager: &'a TodoManager,
    now: DateTime<Utc>,
    count: usize,
) -> Recommendations<'a> {
    let weights = SignalWeights::default();
    let today = now.date_naive();

    let mut entries: Vec<ScoredTask<'a>> = manager
        .filter(false)
        .map(|item| {
            let inputs = SignalInputs {
                days_until_due: item.due.map(|due| (due - today).num_days() as f64),
                age_days: (now - item.created).num_seconds() as f64 / SECONDS_PER_DAY,
                priority: item.priority(),
            };
            let score = signal_score(&inputs, &weights);
            let reason = explain(&inputs, &weights);
            ScoredTask {
                item,
                score,
                reason,
            }
        })
        .collect();

    // Stable sort: tied scores keep snapshot order, which makes the
    // ranking deterministic and testable.
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(count);

    debug!(count = entries.len(), "recommendations computed");
    Recommendations { entries }
}

/// Name the dominant weighted signal for a scored task.
fn explain(inputs: &SignalInputs, weights: &SignalWeights) -> String {
    let due = weights.alpha * due_component(inputs.days_until_due);
    let wait = weights.beta * wait_component(inputs.age_days);
    let priority = weights.gamma * priority_component(inputs.priority);

    if due <= 0.0 && wait <= 0.0 && priority <= 0.0 {
        return "recently added".to_string();
    }

    if due >= wait && due >= priority {
        return describe_due(inputs.days_until_due);
    }
    if priority >= wait {
        return format!(
            "high priority ({})",
            "!".repeat(usize::from(inputs.priority))
        );
    }
    format!("waiting {} days", inputs.age_days.floor() as i64)
}

fn describe_due(days_until_due: Option<f64>) -> String {
    match days_until_due {
        None => "recently added".to_string(),
        Some(days) if days < 0.0 => {
            let overdue = (-days).ceil() as i64;
            if overdue == 1 {
                "overdue by 1 day".to_string()
            } else {
                format!("overdue by {overdue} days")
            }
        }
        Some(days) if days == 0.0 => "due today".to_string(),
        Some(days) => {
            let ahead = days.ceil() as i64;
            if ahead == 1 {
                "due tomorrow".to_string()
            } else {
                format!("due in {ahead} days")
            }
        }
    }
}
