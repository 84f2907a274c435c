//! Job entries and the consumer wake-up notification.

use crate::identity::generate_id;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message type of the notification that wakes a queue consumer.
pub const START_PROCESSING_TYPE: &str = "DaedalusStartProcessingRequest";

/// One unit of background work.
///
/// Built by a queue manager at submission time and never mutated after.
///
/// ```
/// use daedalus_tasks::JobEntry;
/// use serde_json::json;
///
/// let entry = JobEntry::new("Echo", json!({"a": 1}), json!(null));
/// let wire = serde_json::to_value(&entry).unwrap();
/// assert_eq!(wire["type"], "Echo");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEntry {
    /// Unique identifier.
    pub id: String,
    /// Processor type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Job payload.
    #[serde(default)]
    pub data: Value,
    /// Job metadata.
    #[serde(default)]
    pub metadata: Value,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
}

impl JobEntry {
    /// Creates an entry with a fresh identifier.
    pub fn new(type_name: impl Into<String>, data: Value, metadata: Value) -> Self {
        Self {
            id: generate_id(),
            type_name: type_name.into(),
            data,
            metadata,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Notification published alongside a remote enqueue.
///
/// It only signals that work may be waiting; the entry may not be visible
/// in the queue yet when a consumer receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartProcessingNotification {
    /// Always [`START_PROCESSING_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Identifier of the entry that triggered the notification.
    pub entry_id: String,
    /// Type name of that entry.
    pub entry_type: String,
}

impl StartProcessingNotification {
    /// Builds the notification for an entry.
    pub fn for_entry(entry: &JobEntry) -> Self {
        Self {
            kind: START_PROCESSING_TYPE.to_string(),
            entry_id: entry.id.clone(),
            entry_type: entry.type_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let entry = JobEntry::new("Echo", json!({"k": "v"}), json!({"m": 1}));
        let wire = serde_json::to_value(&entry).unwrap();

        assert_eq!(wire["type"], "Echo");
        assert_eq!(wire["data"], json!({"k": "v"}));
        assert_eq!(wire["metadata"], json!({"m": 1}));
        assert!(wire["createdAt"].as_i64().unwrap() > 0);
        assert!(wire.get("typeName").is_none());
    }

    #[test]
    fn test_decodes_minimal_entry() {
        let entry: JobEntry = serde_json::from_str(r#"{"id":"x","type":"NoOp"}"#).unwrap();
        assert_eq!(entry.type_name, "NoOp");
        assert_eq!(entry.data, Value::Null);
        assert_eq!(entry.created_at, 0);
    }

    #[test]
    fn test_notification_shape() {
        let entry = JobEntry::new("Echo", Value::Null, Value::Null);
        let wire = serde_json::to_value(StartProcessingNotification::for_entry(&entry)).unwrap();
        assert_eq!(
            wire,
            json!({
                "type": START_PROCESSING_TYPE,
                "entryId": entry.id,
                "entryType": "Echo",
            })
        );
    }
}
