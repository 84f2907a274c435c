//! The processor capability and a closure-backed implementation.

use crate::error::TaskResult;
use daedalus_core::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A programmatic payload check returning validation messages.
pub type PayloadCheck = dyn Fn(&Value) -> Vec<String> + Send + Sync;

/// Executes job entries of one declared type.
///
/// A field may be validated by a named schema in the model validator or by
/// a programmatic check, never both.
pub trait Processor: Send + Sync + 'static {
    /// The job type this processor handles.
    fn type_name(&self) -> &str;

    /// Model name the job data must satisfy.
    fn data_schema(&self) -> Option<&str> {
        None
    }

    /// Model name the job metadata must satisfy.
    fn metadata_schema(&self) -> Option<&str> {
        None
    }

    /// Programmatic data check.
    fn data_validator(&self) -> Option<&PayloadCheck> {
        None
    }

    /// Programmatic metadata check.
    fn metadata_validator(&self) -> Option<&PayloadCheck> {
        None
    }

    /// Runs one job.
    fn process(&self, data: Value, metadata: Value) -> BoxFuture<'_, TaskResult<Value>>;
}

/// Treats a blank schema name as no schema.
pub(crate) fn declared_schema(schema: Option<&str>) -> Option<&str> {
    schema.filter(|name| !name.trim().is_empty())
}

type ProcessFn = Arc<dyn Fn(Value, Value) -> BoxFuture<'static, TaskResult<Value>> + Send + Sync>;

/// A processor built from an async closure.
///
/// ```
/// use daedalus_tasks::{FnProcessor, Processor};
/// use serde_json::Value;
///
/// let processor = FnProcessor::new("Thumbnail", |data: Value, _meta: Value| async move {
///     Ok(data)
/// })
/// .with_data_schema("ThumbnailRequest");
///
/// assert_eq!(processor.type_name(), "Thumbnail");
/// assert_eq!(processor.data_schema(), Some("ThumbnailRequest"));
/// ```
pub struct FnProcessor {
    type_name: String,
    data_schema: Option<String>,
    metadata_schema: Option<String>,
    data_validator: Option<Box<PayloadCheck>>,
    metadata_validator: Option<Box<PayloadCheck>>,
    func: ProcessFn,
}

impl FnProcessor {
    /// Creates a processor for `type_name`.
    pub fn new<F, Fut>(type_name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult<Value>> + Send + 'static,
    {
        let func: ProcessFn = Arc::new(move |data, metadata| -> BoxFuture<'static, TaskResult<Value>> {
            Box::pin(func(data, metadata))
        });
        Self {
            type_name: type_name.into(),
            data_schema: None,
            metadata_schema: None,
            data_validator: None,
            metadata_validator: None,
            func,
        }
    }

    /// Validates data against a named model.
    pub fn with_data_schema(mut self, model: impl Into<String>) -> Self {
        self.data_schema = Some(model.into());
        self
    }

    /// Validates metadata against a named model.
    pub fn with_metadata_schema(mut self, model: impl Into<String>) -> Self {
        self.metadata_schema = Some(model.into());
        self
    }

    /// Validates data with a closure.
    pub fn with_data_validator(
        mut self,
        check: impl Fn(&Value) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.data_validator = Some(Box::new(check));
        self
    }

    /// Validates metadata with a closure.
    pub fn with_metadata_validator(
        mut self,
        check: impl Fn(&Value) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.metadata_validator = Some(Box::new(check));
        self
    }
}

impl Processor for FnProcessor {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn data_schema(&self) -> Option<&str> {
        self.data_schema.as_deref()
    }

    fn metadata_schema(&self) -> Option<&str> {
        self.metadata_schema.as_deref()
    }

    fn data_validator(&self) -> Option<&PayloadCheck> {
        self.data_validator.as_deref()
    }

    fn metadata_validator(&self) -> Option<&PayloadCheck> {
        self.metadata_validator.as_deref()
    }

    fn process(&self, data: Value, metadata: Value) -> BoxFuture<'_, TaskResult<Value>> {
        (self.func)(data, metadata)
    }
}

impl fmt::Debug for FnProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProcessor")
            .field("type_name", &self.type_name)
            .field("data_schema", &self.data_schema)
            .field("metadata_schema", &self.metadata_schema)
            .field("data_validator", &self.data_validator.is_some())
            .field("metadata_validator", &self.metadata_validator.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use serde_json::json;

    #[tokio::test]
    async fn test_process_runs_closure() {
        let processor = FnProcessor::new("Sum", |data: Value, _| async move {
            let total: i64 = data
                .as_array()
                .map(|items| items.iter().filter_map(Value::as_i64).sum())
                .unwrap_or_default();
            Ok(json!(total))
        });
        assert_eq!(processor.process(json!([1, 2, 3]), Value::Null).await.unwrap(), json!(6));
    }

    #[tokio::test]
    async fn test_process_propagates_failure() {
        let processor = FnProcessor::new("Fail", |_, _| async {
            Err(TaskError::processing_failed("Fail", "nope"))
        });
        assert!(processor.process(Value::Null, Value::Null).await.is_err());
    }

    #[test]
    fn test_validators() {
        let processor = FnProcessor::new("V", |d, _| async move { Ok(d) })
            .with_data_validator(|d| {
                if d.is_object() {
                    Vec::new()
                } else {
                    vec!["data must be an object".to_string()]
                }
            })
            .with_metadata_schema("Meta");

        let check = processor.data_validator().unwrap();
        assert!(check(&json!({})).is_empty());
        assert_eq!(check(&json!(1)).len(), 1);
        assert!(processor.metadata_validator().is_none());
        assert_eq!(processor.metadata_schema(), Some("Meta"));
        assert!(format!("{processor:?}").contains("data_validator: true"));
    }
}
