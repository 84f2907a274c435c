//! Built-in processors.
//!
//! Useful for smoke tests of a deployment's queue wiring and as examples.

use crate::error::TaskResult;
use crate::processor::Processor;
use daedalus_core::BoxFuture;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Type name of [`EchoProcessor`].
pub const ECHO_TYPE: &str = "DaedalusBuiltInEchoProcessor";
/// Type name of [`NoOpProcessor`].
pub const NO_OP_TYPE: &str = "DaedalusBuiltInNoOpProcessor";
/// Type name of [`SampleDelayProcessor`].
pub const SAMPLE_DELAY_TYPE: &str = "DaedalusBuiltInSampleDelayProcessor";
/// Type name and data schema of [`SampleInputValidatedProcessor`].
pub const SAMPLE_INPUT_VALIDATED_TYPE: &str = "DaedalusBuiltInSampleInputValidatedProcessor";

/// Default delay of [`SampleDelayProcessor`].
pub const DEFAULT_SAMPLE_DELAY: Duration = Duration::from_millis(2500);

/// Logs its input and returns it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoProcessor;

impl Processor for EchoProcessor {
    fn type_name(&self) -> &str {
        ECHO_TYPE
    }

    fn process(&self, data: Value, metadata: Value) -> BoxFuture<'_, TaskResult<Value>> {
        Box::pin(async move {
            tracing::info!(data = %data, metadata = %metadata, "echo processor");
            Ok(json!({ "data": data, "metadata": metadata }))
        })
    }
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProcessor;

impl Processor for NoOpProcessor {
    fn type_name(&self) -> &str {
        NO_OP_TYPE
    }

    fn process(&self, _data: Value, _metadata: Value) -> BoxFuture<'_, TaskResult<Value>> {
        Box::pin(async { Ok(Value::Null) })
    }
}

/// Sleeps, then reports how long it slept in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct SampleDelayProcessor {
    delay: Duration,
}

impl Default for SampleDelayProcessor {
    fn default() -> Self {
        Self {
            delay: DEFAULT_SAMPLE_DELAY,
        }
    }
}

impl SampleDelayProcessor {
    /// Sets the delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Processor for SampleDelayProcessor {
    fn type_name(&self) -> &str {
        SAMPLE_DELAY_TYPE
    }

    fn process(&self, _data: Value, _metadata: Value) -> BoxFuture<'_, TaskResult<Value>> {
        Box::pin(async move {
            let started = tokio::time::Instant::now();
            tokio::time::sleep(self.delay).await;
            let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(elapsed_ms = elapsed, "sample delay finished");
            Ok(json!(elapsed))
        })
    }
}

/// Requires its data to satisfy the model of the same name, then returns it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleInputValidatedProcessor;

impl Processor for SampleInputValidatedProcessor {
    fn type_name(&self) -> &str {
        SAMPLE_INPUT_VALIDATED_TYPE
    }

    fn data_schema(&self) -> Option<&str> {
        Some(SAMPLE_INPUT_VALIDATED_TYPE)
    }

    fn process(&self, data: Value, _metadata: Value) -> BoxFuture<'_, TaskResult<Value>> {
        Box::pin(async move { Ok(data) })
    }
}

/// Returns every built-in processor.
///
/// [`SampleInputValidatedProcessor`] needs a model validator holding its
/// schema at registration time.
pub fn all() -> Vec<Arc<dyn Processor>> {
    vec![
        Arc::new(EchoProcessor),
        Arc::new(NoOpProcessor),
        Arc::new(SampleDelayProcessor::default()),
        Arc::new(SampleInputValidatedProcessor),
    ]
}
