//! Todo item model
//!
//! Storage records, the public projection returned to clients, and the key
//! layout shared by every store backend.

mod input;

pub use input::{CreateTodo, UpdateTodo, ValidationError};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};

/// Partition shared by every todo item
pub const PARTITION: &str = "default";

/// Sort key prefix, also used as the range-query filter
pub const SORT_KEY_PREFIX: &str = "todo#";

/// Storage key of a single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoKey {
    pub partition: String,
    pub sort_key: String,
}

impl TodoKey {
    pub fn for_id(id: &str) -> Self {
        Self {
            partition: PARTITION.to_string(),
            sort_key: format!("{SORT_KEY_PREFIX}{id}"),
        }
    }
}

/// Todo item as persisted, storage keys included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRecord {
    pub partition: String,
    pub sort_key: String,
    pub title: String,
    pub done: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TodoRecord {
    /// Build a fresh record; `created_at` and `updated_at` both take `now`
    pub fn new(id: &str, title: String, done: bool, now: String) -> Self {
        let key = TodoKey::for_id(id);
        Self {
            partition: key.partition,
            sort_key: key.sort_key,
            title,
            done,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        self.sort_key
            .strip_prefix(SORT_KEY_PREFIX)
            .unwrap_or(&self.sort_key)
    }

    pub fn key(&self) -> TodoKey {
        TodoKey {
            partition: self.partition.clone(),
            sort_key: self.sort_key.clone(),
        }
    }

    /// Project onto the client-facing shape, dropping storage keys
    pub fn to_public(&self) -> PublicTodo {
        PublicTodo {
            id: self.id().to_string(),
            title: self.title.clone(),
            done: self.done,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
        self.updated_at.clone_from(&patch.updated_at);
    }
}

/// Fields touched by an update; `updated_at` is always refreshed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub done: Option<bool>,
    pub updated_at: String,
}

/// Public item shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTodo {
    pub id: String,
    pub title: String,
    pub done: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Generate a new item id (UUID v7: millisecond timestamp plus random bits)
pub fn generate_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

// Last timestamp handed out, in microseconds since the epoch
static LAST_ISSUED_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current time as an ISO-8601 UTC string with microsecond precision
///
/// Strictly increasing within the process: a call landing in the same
/// microsecond as the previous one (or after a clock step back) gets the
/// previous value plus one microsecond.
pub fn timestamp_now() -> String {
    let now = Utc::now().timestamp_micros();
    let previous = LAST_ISSUED_MICROS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or_else(|last| last);
    let issued = now.max(previous.saturating_add(1));

    DateTime::<Utc>::from_timestamp_micros(issued)
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TodoRecord {
        TodoRecord::new(
            "abc",
            "Buy milk".to_string(),
            false,
            "2024-01-01T00:00:00.000Z".to_string(),
        )
    }

    #[test]
    fn test_key_layout() {
        let key = TodoKey::for_id("abc");
        assert_eq!(key.partition, "default");
        assert_eq!(key.sort_key, "todo#abc");
        assert_eq!(sample().key(), key);
    }

    #[test]
    fn test_public_projection_strips_keys() {
        let value = serde_json::to_value(sample().to_public()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "abc",
                "title": "Buy milk",
                "done": false,
                "createdAt": "2024-01-01T00:00:00.000Z",
                "updatedAt": "2024-01-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn test_apply_patch_keeps_untouched_fields() {
        let mut record = sample();
        record.apply(&TodoPatch {
            title: None,
            done: Some(true),
            updated_at: "2024-01-02T00:00:00.000Z".to_string(),
        });
        assert_eq!(record.title, "Buy milk");
        assert!(record.done);
        assert_eq!(record.created_at, "2024-01-01T00:00:00.000Z");
        assert_eq!(record.updated_at, "2024-01-02T00:00:00.000Z");
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(!a.contains('#'));
    }

    #[test]
    fn test_timestamp_format() {
        let now = timestamp_now();
        assert!(now.ends_with('Z'));
        assert_eq!(now.len(), "2024-01-01T00:00:00.000000Z".len());
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        // Back-to-back calls share a microsecond far more often than not
        let mut previous = timestamp_now();
        for _ in 0..1000 {
            let next = timestamp_now();
            assert!(next > previous, "{next} is not after {previous}");
            previous = next;
        }
    }
}
