//! Consumer-side job execution.
//!
//! The [`BackgroundHandler`] takes an entry, finds its processor, validates
//! the payload and runs it. The local queue manager calls it inline; a
//! remote consumer calls [`BackgroundHandler::process_serialized`] for each
//! message it pulls off the queue.

use crate::entry::{JobEntry, START_PROCESSING_TYPE};
use crate::error::{TaskError, TaskResult};
use crate::processor::{declared_schema, PayloadCheck, Processor};
use crate::registry::ProcessorRegistry;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Runs job entries against the processor registry.
#[derive(Debug, Clone)]
pub struct BackgroundHandler {
    registry: Arc<ProcessorRegistry>,
}

impl BackgroundHandler {
    /// Creates a handler.
    pub fn new(registry: Arc<ProcessorRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<ProcessorRegistry> {
        &self.registry
    }

    /// Validates and runs one entry, returning the processor's output.
    ///
    /// # Errors
    ///
    /// - [`TaskError::UnknownProcessor`] if no processor handles the type
    /// - [`TaskError::InvalidPayload`] if data or metadata fail validation
    /// - whatever the processor itself returns
    pub async fn process_entry(&self, entry: &JobEntry) -> TaskResult<Value> {
        let processor = self
            .registry
            .get(&entry.type_name)
            .ok_or_else(|| TaskError::unknown_processor(&entry.type_name))?;

        let mut errors = self.validate_field(
            processor.as_ref(),
            processor.data_schema(),
            processor.data_validator(),
            &entry.data,
        )?;
        errors.extend(self.validate_field(
            processor.as_ref(),
            processor.metadata_schema(),
            processor.metadata_validator(),
            &entry.metadata,
        )?);
        if !errors.is_empty() {
            tracing::warn!(
                entry_id = %entry.id,
                entry_type = %entry.type_name,
                errors = ?errors,
                "job payload failed validation"
            );
            return Err(TaskError::invalid_payload(&entry.type_name, errors));
        }

        let started = Instant::now();
        tracing::debug!(entry_id = %entry.id, entry_type = %entry.type_name, "processing job");

        let result = processor
            .process(entry.data.clone(), entry.metadata.clone())
            .await;

        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(_) => tracing::info!(
                entry_id = %entry.id,
                entry_type = %entry.type_name,
                elapsed_ms,
                "job processed"
            ),
            Err(error) => tracing::warn!(
                entry_id = %entry.id,
                entry_type = %entry.type_name,
                elapsed_ms,
                error = %error,
                "job failed"
            ),
        }
        result
    }

    /// Decodes a queue message body and runs the entry.
    pub async fn process_serialized(&self, body: &str) -> TaskResult<Value> {
        let entry: JobEntry = serde_json::from_str(body)?;
        self.process_entry(&entry).await
    }

    /// Returns true if `message` is a start-processing notification.
    pub fn is_start_processing_notification(message: &str) -> bool {
        serde_json::from_str::<Value>(message)
            .ok()
            .and_then(|value| {
                value
                    .get("type")
                    .and_then(Value::as_str)
                    .map(|kind| kind == START_PROCESSING_TYPE)
            })
            .unwrap_or(false)
    }

    fn validate_field(
        &self,
        processor: &dyn Processor,
        schema: Option<&str>,
        check: Option<&PayloadCheck>,
        value: &Value,
    ) -> TaskResult<Vec<String>> {
        if let Some(schema) = declared_schema(schema) {
            let validator = self.registry.validator().ok_or_else(|| {
                TaskError::invalid_config(format!(
                    "{} defines schema {schema} but model validator not set",
                    processor.type_name()
                ))
            })?;
            return Ok(validator.validate(schema, value, true, true));
        }
        Ok(check.map(|check| check(value)).unwrap_or_default())
    }
}
