//! Queue manager backed by a network queue.
//!
//! Each accepted submission becomes one serialized [`JobEntry`] on the queue
//! plus one start-processing notification. Neither send is retried.

use super::{
    NotificationClient, QueueAttributes, QueueClient, QueueManager, ALL_ATTRIBUTES,
};
use crate::config::RemoteQueueSettings;
use crate::entry::{JobEntry, StartProcessingNotification};
use crate::error::{TaskError, TaskResult};
use daedalus_core::BoxFuture;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Ships job entries to a network queue.
///
/// Enqueue and the wake-up notification are sent concurrently and are
/// independent: a consumer may see the notification before the entry.
pub struct RemoteQueueManager {
    settings: RemoteQueueSettings,
    process_names: HashSet<String>,
    queue: Arc<dyn QueueClient>,
    notifications: Arc<dyn NotificationClient>,
}

impl RemoteQueueManager {
    /// Creates a manager accepting the given processor type names.
    pub fn new(
        settings: RemoteQueueSettings,
        process_names: impl IntoIterator<Item = String>,
        queue: Arc<dyn QueueClient>,
        notifications: Arc<dyn NotificationClient>,
    ) -> Self {
        Self {
            settings,
            process_names: process_names.into_iter().collect(),
            queue,
            notifications,
        }
    }

    /// Returns the queue addresses.
    pub fn settings(&self) -> &RemoteQueueSettings {
        &self.settings
    }

    async fn submit(&self, entry: JobEntry) -> TaskResult<JobEntry> {
        let body = serde_json::to_string(&entry)?;
        let notification = serde_json::to_string(&StartProcessingNotification::for_entry(&entry))?;

        let (enqueued, published) = tokio::join!(
            self.queue.enqueue(&self.settings.queue_url, body),
            self.notifications
                .publish(&self.settings.notification_address, notification),
        );

        let message_id = enqueued.map_err(|e| {
            tracing::error!(entry_id = %entry.id, error = %e, "enqueue failed");
            TaskError::queue_unavailable(format!("enqueue of entry {} failed", entry.id), e)
        })?;
        let notification_id = published.map_err(|e| {
            tracing::error!(entry_id = %entry.id, error = %e, "start notification failed");
            TaskError::queue_unavailable(
                format!("start notification for entry {} failed", entry.id),
                e,
            )
        })?;

        tracing::info!(
            entry_id = %entry.id,
            entry_type = %entry.type_name,
            message_id = %message_id,
            notification_id = %notification_id,
            "job enqueued"
        );
        Ok(entry)
    }
}

impl QueueManager for RemoteQueueManager {
    fn is_local(&self) -> bool {
        false
    }

    fn create_entry<'a>(
        &'a self,
        type_name: &'a str,
        data: Value,
        metadata: Value,
    ) -> BoxFuture<'a, TaskResult<Option<JobEntry>>> {
        Box::pin(async move {
            if !self.process_names.contains(type_name) {
                tracing::warn!(entry_type = type_name, "no processor for type, entry not created");
                return Ok(None);
            }
            self.submit(JobEntry::new(type_name, data, metadata))
                .await
                .map(Some)
        })
    }

    fn fetch_current_queue_attributes(&self) -> BoxFuture<'_, TaskResult<QueueAttributes>> {
        Box::pin(async move {
            self.queue
                .get_queue_attributes(&self.settings.queue_url, &[ALL_ATTRIBUTES])
                .await
                .map_err(|e| TaskError::queue_unavailable("fetching queue attributes failed", e))
        })
    }
}

impl fmt::Debug for RemoteQueueManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteQueueManager")
            .field("settings", &self.settings)
            .field("process_names", &self.process_names)
            .finish_non_exhaustive()
    }
}
