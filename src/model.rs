//! Task rows as the store returns them, and the canonical client view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned task identifier
pub type TaskId = i64;

/// Timestamp as it arrives from a store.
///
/// PostgREST hands back text, in-process stores hand back native values, and
/// some drivers serialize epoch milliseconds. Deserialization tries the
/// variants in order, so JSON strings always land in `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Text(String),
    DateTime(DateTime<Utc>),
    Millis(i64),
    Other(serde_json::Value),
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        RawTimestamp::DateTime(value)
    }
}

/// A task row exactly as read from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
    pub id: TaskId,
    pub task: String,
    #[serde(alias = "isComplete")]
    pub is_complete: bool,
    #[serde(alias = "ownerId")]
    pub owner_id: String,
    #[serde(alias = "insertedAt")]
    pub inserted_at: RawTimestamp,
}

/// Insert payload; `id`, `is_complete` and `inserted_at` come from store defaults
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub task: String,
    pub owner_id: String,
}

/// Update payload for the completion flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionPatch {
    pub is_complete: bool,
}

/// Canonical client view of a task: `inserted_at` is always an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: TaskId,
    pub task: String,
    pub is_complete: bool,
    pub owner_id: String,
    pub inserted_at: String,
}
