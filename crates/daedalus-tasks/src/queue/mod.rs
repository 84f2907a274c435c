//! Queue managers and the transport traits they sit on.
//!
//! A [`QueueManager`] accepts job submissions. Two variants are provided:
//!
//! - [`RemoteQueueManager`] serializes the entry to a network queue through
//!   a [`QueueClient`] and wakes consumers through a [`NotificationClient`]
//! - [`LocalQueueManager`] runs the entry in-process before returning
//!
//! Both return `Ok(None)` for a type no processor handles, without touching
//! any transport.

mod local;
mod remote;

pub use local::LocalQueueManager;
pub use remote::RemoteQueueManager;

use crate::entry::JobEntry;
use crate::error::TaskResult;
use daedalus_core::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;

/// Raw queue attributes as reported by the transport.
pub type QueueAttributes = HashMap<String, String>;

/// Attribute holding the approximate number of pending messages.
pub const APPROXIMATE_NUMBER_OF_MESSAGES: &str = "ApproximateNumberOfMessages";

/// Attribute name requesting every attribute.
pub const ALL_ATTRIBUTES: &str = "All";

/// Network queue transport.
pub trait QueueClient: Send + Sync + 'static {
    /// Sends a message body to a queue, returning the transport's message id.
    fn enqueue<'a>(&'a self, queue_url: &'a str, body: String)
        -> BoxFuture<'a, anyhow::Result<String>>;

    /// Reads queue attributes.
    fn get_queue_attributes<'a>(
        &'a self,
        queue_url: &'a str,
        names: &'a [&'a str],
    ) -> BoxFuture<'a, anyhow::Result<QueueAttributes>>;
}

/// Notification transport.
pub trait NotificationClient: Send + Sync + 'static {
    /// Publishes a message, returning the transport's message id.
    fn publish<'a>(&'a self, address: &'a str, message: String)
        -> BoxFuture<'a, anyhow::Result<String>>;
}

/// Accepts job submissions.
pub trait QueueManager: Send + Sync + 'static {
    /// Returns true for the in-process variant.
    fn is_local(&self) -> bool;

    /// Submits a job.
    ///
    /// Returns `Ok(None)` if no processor handles `type_name`; that is not a
    /// failure. The returned entry confirms submission, not remote
    /// durability.
    fn create_entry<'a>(
        &'a self,
        type_name: &'a str,
        data: Value,
        metadata: Value,
    ) -> BoxFuture<'a, TaskResult<Option<JobEntry>>>;

    /// Returns the raw queue attributes.
    fn fetch_current_queue_attributes(&self) -> BoxFuture<'_, TaskResult<QueueAttributes>>;

    /// Returns the approximate number of pending entries.
    ///
    /// A missing or non-numeric attribute counts as zero.
    fn fetch_approximate_number_of_queue_entries(&self) -> BoxFuture<'_, TaskResult<u64>> {
        Box::pin(async move {
            let attributes = self.fetch_current_queue_attributes().await?;
            Ok(approximate_count(&attributes))
        })
    }
}

/// Reads [`APPROXIMATE_NUMBER_OF_MESSAGES`], treating anything unparseable
/// as zero.
pub fn approximate_count(attributes: &QueueAttributes) -> u64 {
    attributes
        .get(APPROXIMATE_NUMBER_OF_MESSAGES)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(value: Option<&str>) -> QueueAttributes {
        value
            .map(|v| (APPROXIMATE_NUMBER_OF_MESSAGES.to_string(), v.to_string()))
            .into_iter()
            .collect()
    }

    #[test]
    fn test_approximate_count() {
        assert_eq!(approximate_count(&attributes(Some("1"))), 1);
        assert_eq!(approximate_count(&attributes(Some(" 42 "))), 42);
        assert_eq!(approximate_count(&attributes(Some("lots"))), 0);
        assert_eq!(approximate_count(&attributes(Some("-3"))), 0);
        assert_eq!(approximate_count(&attributes(None)), 0);
    }
}
