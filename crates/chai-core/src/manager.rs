//! Task lifecycle and lookup.
//!
//! The manager is the authoritative in-memory view of the collection.
//! Mutations are persisted before the view is updated, so the view never
//! silently diverges from durable state: on a failed save the caller gets
//! an error and the manager still holds the pre-mutation collection.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::recurrence::Recurrence;
use crate::model::todo::{TodoItem, derive_slug};
use crate::store::Store;

/// The authoritative view plus all task-identity and lifecycle operations.
#[derive(Debug)]
pub struct TodoManager {
    store: Store,
    items: Vec<TodoItem>,
}

impl TodoManager {
    /// Manager over `store` with an empty view; call [`load`] to populate.
    ///
    /// [`load`]: TodoManager::load
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self {
            store,
            items: Vec::new(),
        }
    }

    /// Open a manager and load the current collection in one step.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn open(store: Store) -> Result<Self, CoreError> {
        let mut manager = Self::new(store);
        manager.load()?;
        Ok(manager)
    }

    /// (Re)populate from the store.
    ///
    /// The manager does not watch for external changes; callers re-invoke
    /// this after any operation that may have been performed by another
    /// process.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn load(&mut self) -> Result<(), CoreError> {
        self.items = self.store.load()?;
        debug!(count = self.items.len(), "manager loaded");
        Ok(())
    }

    /// The full collection in stable insertion order.
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Order-preserving iterator over items with the given `done` flag.
    pub fn filter(&self, done: bool) -> impl Iterator<Item = &TodoItem> {
        self.items.iter().filter(move |item| item.done == done)
    }

    /// Resolve a caller-supplied token to the unique matching task.
    ///
    /// Strategies are explicit and tried in order, with no coercion
    /// between the numeric and slug forms:
    ///
    /// 1. a token that parses as an id and matches one wins;
    /// 2. an exact slug match wins; if several items share the slug
    ///    (a completed recurring instance next to its successor), the
    ///    single pending one is preferred;
    /// 3. otherwise a prefix match over pending items' slugs must be
    ///    unique.
    ///
    /// # Errors
    ///
    /// [`CoreError::AmbiguousMatch`] when more than one task matches
    /// (candidate slugs listed for the caller to disambiguate),
    /// [`CoreError::NotFound`] when none does.
    pub fn resolve(&self, token: &str) -> Result<&TodoItem, CoreError> {
        let token = token.trim();

        if let Ok(id) = token.parse::<u64>() {
            if let Some(item) = self.get(id) {
                return Ok(item);
            }
        }

        let exact: Vec<&TodoItem> = self
            .items
            .iter()
            .filter(|item| item.slug == token)
            .collect();
        match exact.len() {
            1 => return Ok(exact[0]),
            0 => {}
            _ => {
                let pending: Vec<&TodoItem> =
                    exact.iter().copied().filter(|item| !item.done).collect();
                if pending.len() == 1 {
                    return Ok(pending[0]);
                }
                let listed = if pending.is_empty() { exact } else { pending };
                return Err(CoreError::AmbiguousMatch {
                    token: token.to_string(),
                    candidates: listed
                        .iter()
                        .map(|item| format!("{} (id {})", item.slug, item.id))
                        .collect(),
                });
            }
        }

        let prefix: Vec<&TodoItem> = self
            .filter(false)
            .filter(|item| item.slug.starts_with(token))
            .collect();
        match prefix.len() {
            0 => Err(CoreError::NotFound {
                token: token.to_string(),
            }),
            1 => Ok(prefix[0]),
            _ => Err(CoreError::AmbiguousMatch {
                token: token.to_string(),
                candidates: prefix.iter().map(|item| item.slug.clone()).collect(),
            }),
        }
    }

    /// Create a pending task from manual entry and persist it.
    ///
    /// Assigns the next id, derives a slug deduplicated against live
    /// (pending) slugs, and returns the stored item.
    ///
    /// # Errors
    ///
    /// Propagates store write failures; the view is unchanged on failure.
    pub fn add(
        &mut self,
        text: &str,
        due: Option<NaiveDate>,
        recurrence: Option<Recurrence>,
        now: DateTime<Utc>,
    ) -> Result<TodoItem, CoreError> {
        let id = next_id(&self.items);
        let slug = unique_slug(&self.items, &derive_slug(text));
        let item = TodoItem::new(id, slug, text, due, recurrence, now);

        let mut next_items = self.items.clone();
        next_items.push(item.clone());
        self.store.save(&next_items)?;
        self.items = next_items;

        info!(id = item.id, slug = %item.slug, "task created");
        Ok(item)
    }

    /// Mark a task done and spawn its recurring successor, if any.
    ///
    /// The successor's due date is computed from the stored due date, not
    /// from `now`, so cadence is never inflated by how late the task was
    /// completed. Completed item and successor are persisted in one
    /// atomic save; the successor (with fresh id, `done = false`) is
    /// returned so callers can surface it.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] for an unknown id,
    /// [`CoreError::AlreadyDone`] when the task is already completed
    /// (re-marking never creates a second successor), and store write
    /// failures, in which case the view still holds the pre-mutation
    /// collection and the caller can `load` and retry.
    pub fn mark_done(
        &mut self,
        id: u64,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TodoItem>, CoreError> {
        let Some(pos) = self.items.iter().position(|item| item.id == id) else {
            return Err(CoreError::NotFound {
                token: id.to_string(),
            });
        };
        if self.items[pos].done {
            return Err(CoreError::AlreadyDone {
                id,
                slug: self.items[pos].slug.clone(),
            });
        }

        let mut next_items = self.items.clone();
        {
            let item = &mut next_items[pos];
            item.done = true;
            item.completed_at = Some(now);
            let notes = notes.trim();
            if !notes.is_empty() {
                item.notes = Some(notes.to_string());
            }
            item.refresh_display_text();
        }

        let successor = next_items[pos].recurrence.map(|rule| {
            // Cadence anchors on the stored due date; completion time only
            // matters when the item never had one.
            let base = next_items[pos].due.unwrap_or_else(|| now.date_naive());
            let due = rule.next_due(base);
            let text = next_items[pos].text.clone();
            let slug = unique_slug(&next_items, &derive_slug(&text));
            TodoItem::new(next_id(&next_items), slug, &text, Some(due), Some(rule), now)
        });
        if let Some(new_item) = &successor {
            next_items.push(new_item.clone());
        }

        self.store.save(&next_items)?;
        self.items = next_items;

        match &successor {
            Some(new_item) => info!(
                id,
                successor = new_item.id,
                due = ?new_item.due,
                "recurring task completed; successor created"
            ),
            None => info!(id, "task completed"),
        }
        Ok(successor)
    }
}

fn next_id(items: &[TodoItem]) -> u64 {
    items.iter().map(|item| item.id).max().unwrap_or(0) + 1
}

/// Deduplicate `base` against pending items' slugs with a numeric suffix.
///
/// Completed items keep their slugs and do not block reuse; a collision
/// with a done item is resolved at lookup time by preferring the pending
/// match.
fn unique_slug(items: &[TodoItem], base: &str) -> String {
    let taken = |slug: &str| items.iter().any(|item| !item.done && item.slug == slug);

    if !taken(base) {
        return base.to_string();
    }
    let mut counter = 2u64;
    loop {
        let candidate = format!("{base}-{counter}");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
