//! In-process queue manager.

use super::{QueueAttributes, QueueManager, APPROXIMATE_NUMBER_OF_MESSAGES};
use crate::entry::JobEntry;
use crate::error::TaskResult;
use crate::handler::BackgroundHandler;
use daedalus_core::BoxFuture;
use serde_json::Value;

/// Runs each submitted job in-process before returning.
///
/// Used for deterministic tests and single-process deployments. The queue
/// never has a backlog.
#[derive(Debug, Clone)]
pub struct LocalQueueManager {
    handler: BackgroundHandler,
}

impl LocalQueueManager {
    /// Creates a manager running jobs through `handler`.
    pub fn new(handler: BackgroundHandler) -> Self {
        Self { handler }
    }

    /// Returns the handler jobs run through.
    pub fn handler(&self) -> &BackgroundHandler {
        &self.handler
    }
}

impl QueueManager for LocalQueueManager {
    fn is_local(&self) -> bool {
        true
    }

    fn create_entry<'a>(
        &'a self,
        type_name: &'a str,
        data: Value,
        metadata: Value,
    ) -> BoxFuture<'a, TaskResult<Option<JobEntry>>> {
        Box::pin(async move {
            if !self.handler.registry().contains(type_name) {
                tracing::warn!(entry_type = type_name, "no processor for type, entry not created");
                return Ok(None);
            }

            let entry = JobEntry::new(type_name, data, metadata);
            tracing::debug!(entry_id = %entry.id, entry_type = type_name, "running job locally");
            self.handler.process_entry(&entry).await?;
            Ok(Some(entry))
        })
    }

    fn fetch_current_queue_attributes(&self) -> BoxFuture<'_, TaskResult<QueueAttributes>> {
        let attributes = QueueAttributes::from([(
            APPROXIMATE_NUMBER_OF_MESSAGES.to_string(),
            "0".to_string(),
        )]);
        Box::pin(async move { Ok(attributes) })
    }

    fn fetch_approximate_number_of_queue_entries(&self) -> BoxFuture<'_, TaskResult<u64>> {
        Box::pin(async { Ok(0) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::processor::{FnProcessor, Processor};
    use crate::registry::ProcessorRegistry;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    fn manager(seen: Arc<Mutex<Vec<Value>>>) -> LocalQueueManager {
        let processors: Vec<Arc<dyn Processor>> = vec![
            Arc::new(FnProcessor::new("Record", move |data, _| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.lock().push(data);
                    Ok(Value::Null)
                }
            })),
            Arc::new(FnProcessor::new("Broken", |_, _| async {
                Err(TaskError::processing_failed("Broken", "disk full"))
            })),
        ];
        let registry = ProcessorRegistry::new(processors, None).unwrap();
        LocalQueueManager::new(BackgroundHandler::new(Arc::new(registry)))
    }

    #[tokio::test]
    async fn test_runs_job_immediately() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let manager = manager(Arc::clone(&seen));

        let entry = manager
            .create_entry("Record", json!({"n": 1}), Value::Null)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(entry.type_name, "Record");
        assert_eq!(*seen.lock(), vec![json!({"n": 1})]);
    }

    #[tokio::test]
    async fn test_unknown_type_returns_none() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let manager = manager(Arc::clone(&seen));
        assert!(manager
            .create_entry("MissingProcessorXYZ", json!({}), json!({}))
            .await
            .unwrap()
            .is_none());
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_processing_failure_propagates() {
        let manager = manager(Arc::new(Mutex::new(Vec::new())));
        let error = manager
            .create_entry("Broken", Value::Null, Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(error, TaskError::ProcessingFailed { .. }));
    }

    #[tokio::test]
    async fn test_never_has_backlog() {
        let manager = manager(Arc::new(Mutex::new(Vec::new())));
        assert!(manager.is_local());
        let attributes = manager.fetch_current_queue_attributes().await.unwrap();
        assert_eq!(attributes[APPROXIMATE_NUMBER_OF_MESSAGES], "0");
        assert_eq!(
            manager.fetch_approximate_number_of_queue_entries().await.unwrap(),
            0
        );
    }
}
