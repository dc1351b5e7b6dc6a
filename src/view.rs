//! Presentation helpers: what to show and which inputs to accept, derived
//! from a [`TodosState`].

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::error::Result;
use crate::model::{TaskId, TaskView};
use crate::state::{Status, TodoList, TodosState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl TodoStats {
    pub fn from_items(items: &[TaskView]) -> Self {
        let completed = items.iter().filter(|task| task.is_complete).count();
        Self {
            total: items.len(),
            completed,
            remaining: items.len() - completed,
        }
    }
}

/// Which controls are enabled and which panel the list area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Input and submit button; disabled only while an add is pending
    pub add_disabled: bool,
    /// Completion checkboxes; disabled only while an update is pending
    pub toggle_disabled: bool,
    /// Delete buttons; disabled only while a delete is pending
    pub delete_disabled: bool,
    /// Fetch in flight: show the loading indicator
    pub loading: bool,
    /// Fetch failed: show "Try Again"
    pub show_retry: bool,
    /// Nothing to list
    pub is_empty: bool,
}

impl Controls {
    pub fn from_state(state: &TodosState) -> Self {
        let loading = state.fetch_status == Status::Pending;
        let show_retry = state.fetch_status == Status::Failed;
        Self {
            add_disabled: state.add_status == Status::Pending,
            toggle_disabled: state.update_status == Status::Pending,
            delete_disabled: state.delete_status == Status::Pending,
            loading,
            show_retry,
            is_empty: !loading && !show_retry && state.items.is_empty(),
        }
    }
}

/// Load on first render only for a signed-in user with nothing loaded yet
pub fn should_fetch_on_mount(signed_in: bool, state: &TodosState) -> bool {
    signed_in && state.fetch_status == Status::Idle && state.items.is_empty()
}

/// Submit the input box. Returns `None` when the submission is ignored:
/// blank input, or an add already pending.
pub async fn submit_task(list: &TodoList, input: &str) -> Option<Result<Vec<TaskView>>> {
    let text = input.trim();
    if text.is_empty() || list.snapshot().add_status == Status::Pending {
        return None;
    }
    Some(list.add(text).await)
}

/// Flip a task's completion flag, unless an update is already pending
pub async fn toggle_task(list: &TodoList, task: &TaskView) -> Option<Result<Vec<TaskView>>> {
    if list.snapshot().update_status == Status::Pending {
        return None;
    }
    Some(list.toggle(task.id, !task.is_complete).await)
}

/// Delete a task, unless a delete is already pending
pub async fn delete_task(list: &TodoList, id: TaskId) -> Option<Result<Vec<TaskView>>> {
    if list.snapshot().delete_status == Status::Pending {
        return None;
    }
    Some(list.remove(id).await)
}

fn parse_inserted_at(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .ok()
}

/// Render a creation time like `Oct 16, 2026, 09:30 AM` in `tz`.
/// `None` when the value is not a timestamp.
pub fn format_inserted_at_in<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let instant = parse_inserted_at(value)?.with_timezone(tz);
    Some(instant.format("%b %-d, %Y, %I:%M %p").to_string())
}

/// [`format_inserted_at_in`] for UTC
pub fn format_inserted_at(value: &str) -> Option<String> {
    format_inserted_at_in(value, &Utc)
}
