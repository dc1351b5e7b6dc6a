//! Conversion from raw store rows to the canonical client view.
//!
//! This is the only place a [`RawTask`] turns into a [`TaskView`].

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{RawTask, RawTimestamp, TaskView};

/// Render an instant as UTC ISO-8601 with millisecond precision
pub fn to_iso_string(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn from_millis(millis: i64) -> Result<String> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| to_iso_string(&dt))
        .ok_or_else(|| Error::normalization(format!("timestamp {} is out of range", millis)))
}

fn from_value(value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Null => from_millis(0),
        Value::Bool(flag) => from_millis(i64::from(*flag)),
        Value::Number(number) => {
            if let Some(millis) = number.as_i64() {
                return from_millis(millis);
            }
            match number.as_f64() {
                Some(millis) if millis.is_finite() => from_millis(millis.trunc() as i64),
                _ => Err(Error::normalization(format!(
                    "timestamp {} is not a finite number",
                    number
                ))),
            }
        }
        other => Err(Error::normalization(format!(
            "cannot build a date from {}",
            other
        ))),
    }
}

/// Coerce a raw timestamp: strings pass through unchanged, native instants
/// are rendered as ISO-8601, anything else must be constructible as a date.
pub fn normalize_timestamp(raw: &RawTimestamp) -> Result<String> {
    match raw {
        RawTimestamp::Text(text) => Ok(text.clone()),
        RawTimestamp::DateTime(dt) => Ok(to_iso_string(dt)),
        RawTimestamp::Millis(millis) => from_millis(*millis),
        RawTimestamp::Other(value) => from_value(value),
    }
}

/// Normalize a single row
pub fn normalize_task(raw: &RawTask) -> Result<TaskView> {
    Ok(TaskView {
        id: raw.id,
        task: raw.task.clone(),
        is_complete: raw.is_complete,
        owner_id: raw.owner_id.clone(),
        inserted_at: normalize_timestamp(&raw.inserted_at)?,
    })
}

/// Normalize rows element-wise, keeping their order
pub fn normalize_tasks(raw: &[RawTask]) -> Result<Vec<TaskView>> {
    raw.iter().map(normalize_task).collect()
}

/// Normalize a loosely-typed payload. Anything other than a JSON array yields
/// an empty list; array elements must still be task rows.
pub fn normalize_tasks_value(value: Value) -> Result<Vec<TaskView>> {
    match value {
        Value::Array(_) => {
            let rows: Vec<RawTask> = serde_json::from_value(value)?;
            normalize_tasks(&rows)
        }
        _ => Ok(Vec::new()),
    }
}
