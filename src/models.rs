use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Capacity {
    pub current_capacity: u32,
    pub max_capacity: u32,
}

/// Canonical time-slot record. Server feeds disagree on field names; every
/// raw record goes through [`normalize`] before it enters the store.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimeSlot {
    /// Numeric or string, depending on the server. Compared via [`slot_id_key`].
    pub id: Value,
    pub start_time: String,
    pub end_time: String,
    pub category: String,
    pub capacity: Capacity,
}

impl TimeSlot {
    /// Quote-trimmed string form of the id, used for all id comparisons.
    pub fn id_key(&self) -> String {
        slot_id_key(&self.id)
    }

    /// Date portion of `start_time` (the part before the first `T`).
    pub fn date(&self) -> &str {
        self.start_time.split('T').next().unwrap_or("")
    }
}

/// One incremental update from the push channel. Merged into an existing
/// slot by id and then discarded; never creates a slot.
#[derive(Debug, Clone)]
pub struct SlotUpdate {
    pub id: Value,
    pub current_capacity: u32,
    pub category: String,
}

impl SlotUpdate {
    /// Maps a push message into an update. Returns `None` when the message
    /// carries no id.
    pub fn from_message(msg: &Value) -> Option<Self> {
        let id = match msg.get("id") {
            Some(v) if !v.is_null() => v.clone(),
            _ => return None,
        };
        Some(Self {
            id,
            current_capacity: json_uint(msg, &["currentCapacity", "current_capacity"])
                .unwrap_or(0),
            category: msg
                .get("category")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// Active board filters. Empty string means "no filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub color: String,
    pub date: String,
}

pub fn slot_id_key(id: &Value) -> String {
    id.to_string().trim_matches('"').to_string()
}

/// First non-empty string among the given keys. An empty string counts as
/// absent and falls through to the next alias.
fn json_str(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        raw.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    })
}

/// First non-zero unsigned integer among the given keys. A `0` counts as
/// absent and falls through to the next alias.
fn json_uint(raw: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|key| {
        raw.get(*key)
            .and_then(Value::as_u64)
            .filter(|n| *n != 0)
            .map(|n| n as u32)
    })
}

/// Maps a raw server record into the canonical shape, resolving field-name
/// aliases by ordered precedence. A missing or falsy value falls through to
/// the next alias and finally to a default: `0` for current capacity, `50`
/// for max capacity, the empty string for timestamps and category.
///
/// Returns `None` for a record without a usable id.
pub fn normalize(raw: &Value) -> Option<TimeSlot> {
    let id = match raw.get("id") {
        Some(v) if !v.is_null() => v.clone(),
        _ => return None,
    };
    let capacity = raw.get("capacity").unwrap_or(&Value::Null);

    Some(TimeSlot {
        id,
        start_time: json_str(raw, &["start_time", "startTime"]).unwrap_or_default(),
        end_time: json_str(raw, &["end_time", "endTime"]).unwrap_or_default(),
        category: raw
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        capacity: Capacity {
            current_capacity: json_uint(capacity, &["current_capacity", "current"]).unwrap_or(0),
            max_capacity: json_uint(capacity, &["max_capacity", "maximum"]).unwrap_or(50),
        },
    })
}
