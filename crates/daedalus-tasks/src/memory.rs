//! In-memory queue and notification transports.
//!
//! Record everything sent to them, report injected attributes, and can be
//! switched into a failure mode. Used by tests and single-process runs.

use crate::queue::{
    NotificationClient, QueueAttributes, QueueClient, ALL_ATTRIBUTES,
    APPROXIMATE_NUMBER_OF_MESSAGES,
};
use daedalus_core::BoxFuture;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// A queue that keeps messages in memory.
#[derive(Debug, Default)]
pub struct InMemoryQueueClient {
    sent: Mutex<Vec<(String, String)>>,
    attributes: Mutex<QueueAttributes>,
    failing: AtomicBool,
}

impl InMemoryQueueClient {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides a reported attribute.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.lock().insert(name.into(), value.into());
    }

    /// Makes every call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns `(queue_url, body)` for every message sent so far.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }

    /// Removes and returns every message sent so far.
    pub fn drain(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.sent.lock())
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("in-memory queue is failing");
        }
        Ok(())
    }
}

impl QueueClient for InMemoryQueueClient {
    fn enqueue<'a>(
        &'a self,
        queue_url: &'a str,
        body: String,
    ) -> BoxFuture<'a, anyhow::Result<String>> {
        let result = self.check().map(|()| {
            self.sent.lock().push((queue_url.to_string(), body));
            Uuid::now_v7().to_string()
        });
        Box::pin(async move { result })
    }

    fn get_queue_attributes<'a>(
        &'a self,
        _queue_url: &'a str,
        names: &'a [&'a str],
    ) -> BoxFuture<'a, anyhow::Result<QueueAttributes>> {
        let result = self.check().map(|()| {
            let mut attributes = self.attributes.lock().clone();
            attributes
                .entry(APPROXIMATE_NUMBER_OF_MESSAGES.to_string())
                .or_insert_with(|| self.sent.lock().len().to_string());
            if !names.contains(&ALL_ATTRIBUTES) {
                attributes.retain(|name, _| names.contains(&name.as_str()));
            }
            attributes
        });
        Box::pin(async move { result })
    }
}

/// A notification channel that keeps messages in memory.
#[derive(Debug, Default)]
pub struct InMemoryNotificationClient {
    published: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl InMemoryNotificationClient {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every publish fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns `(address, message)` for every message published so far.
    pub fn published_messages(&self) -> Vec<(String, String)> {
        self.published.lock().clone()
    }
}

impl NotificationClient for InMemoryNotificationClient {
    fn publish<'a>(
        &'a self,
        address: &'a str,
        message: String,
    ) -> BoxFuture<'a, anyhow::Result<String>> {
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(anyhow::anyhow!("in-memory notification channel is failing"))
        } else {
            self.published.lock().push((address.to_string(), message));
            Ok(Uuid::now_v7().to_string())
        };
        Box::pin(async move { result })
    }
}
