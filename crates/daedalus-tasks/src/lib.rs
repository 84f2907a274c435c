//! # Daedalus Tasks
//!
//! Background job submission and processing for Daedalus.
//!
//! ```text
//! submit(type, data, metadata)
//!        │
//!        ▼
//!   QueueManager ──unknown type──► Ok(None)
//!        │
//!   ┌────┴──────────────┐
//!   ▼                   ▼
//! Remote              Local
//! enqueue + notify    BackgroundHandler::process_entry (inline)
//!   │
//!   ▼
//! consumer: BackgroundHandler::process_serialized
//! ```
//!
//! ## Registering processors
//!
//! ```rust
//! use daedalus_tasks::{builtin, Processor, ProcessorRegistry};
//! use std::sync::Arc;
//!
//! let processors: Vec<Arc<dyn Processor>> =
//!     vec![Arc::new(builtin::EchoProcessor), Arc::new(builtin::NoOpProcessor)];
//! let registry = ProcessorRegistry::new(processors, None).unwrap();
//! assert_eq!(registry.process_names(), vec![builtin::ECHO_TYPE, builtin::NO_OP_TYPE]);
//! ```
//!
//! ## Submitting work
//!
//! ```rust
//! use daedalus_tasks::{builtin, BackgroundHandler, LocalQueueManager, ProcessorRegistry, QueueManager};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let processors: Vec<Arc<dyn daedalus_tasks::Processor>> = vec![Arc::new(builtin::EchoProcessor)];
//! let registry = ProcessorRegistry::new(processors, None).unwrap();
//! let queue = LocalQueueManager::new(BackgroundHandler::new(Arc::new(registry)));
//!
//! let entry = queue
//!     .create_entry(builtin::ECHO_TYPE, json!({"hello": "world"}), json!({}))
//!     .await
//!     .unwrap();
//! assert!(entry.is_some());
//!
//! let missing = queue.create_entry("Nope", json!({}), json!({})).await.unwrap();
//! assert!(missing.is_none());
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus-tasks/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod builtin;
pub mod config;
pub mod entry;
pub mod error;
pub mod handler;
pub mod identity;
pub mod memory;
pub mod processor;
pub mod queue;
pub mod registry;

pub use config::{BackgroundConfig, QueueMode, RemoteQueueSettings};
pub use entry::{JobEntry, StartProcessingNotification, START_PROCESSING_TYPE};
pub use error::{TaskError, TaskResult};
pub use handler::BackgroundHandler;
pub use identity::{generate_id, id_to_path, path_to_id};
pub use memory::{InMemoryNotificationClient, InMemoryQueueClient};
pub use processor::{FnProcessor, PayloadCheck, Processor};
pub use queue::{
    approximate_count, LocalQueueManager, NotificationClient, QueueAttributes, QueueClient,
    QueueManager, RemoteQueueManager, APPROXIMATE_NUMBER_OF_MESSAGES,
};
pub use registry::ProcessorRegistry;
