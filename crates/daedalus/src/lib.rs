//! # Daedalus
//!
//! **Request dispatch and background job queueing for serverless HTTP
//! endpoints.**
//!
//! - Route matching with path parameters and deployment-stage stripping
//! - Token authorization and body model validation per route
//! - Uniform error envelopes, CORS and request ID headers on every response
//! - Background jobs processed inline (local) or shipped to a remote queue
//!
//! ## Quick Start
//!
//! ```
//! use daedalus::prelude::*;
//! use http::Method;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let instance = Instance::builder()
//!     .route(
//!         Method::GET,
//!         "/meta/item/{itemId}",
//!         Route::new(|request| async move {
//!             Ok(json!({"itemId": request.path_parameter("itemId")}))
//!         }),
//!     )
//!     .processor(daedalus::tasks::builtin::EchoProcessor)
//!     .build()
//!     .unwrap();
//!
//! let response = instance
//!     .dispatch(InboundRequest::new(Method::GET, "/meta/item/42"))
//!     .await;
//! assert_eq!(response.status(), 200);
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! InboundRequest → Dispatcher ─► Normalize → Match → Authorization → Validation → Handler
//!                                                                                   │
//!                           POST {submission path} ─► QueueManager ─┬─► Local: process now
//!                                                                   └─► Remote: enqueue + notify
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod background;
mod error;
mod instance;
pub mod sample;

pub use error::{BootstrapError, BootstrapResult};
pub use instance::{init_logging, Instance, InstanceBuilder};

// Re-export core types
pub use daedalus_core as core;

// Re-export router types
pub use daedalus_router as router;

// Re-export middleware types
pub use daedalus_middleware as middleware;

// Re-export background job types
pub use daedalus_tasks as tasks;

// Re-export configuration types
pub use daedalus_config as config;

// Re-export telemetry types
pub use daedalus_telemetry as telemetry;

pub use daedalus_middleware::Route;

/// Prelude module for convenient imports.
///
/// ```
/// use daedalus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{BootstrapError, Instance, InstanceBuilder};

    pub use daedalus_core::{
        DispatchError, DispatchResult, InboundRequest, ModelValidator, Response, ResponseExt,
        SchemaModelValidator, StaticTokenManipulator, Token, TokenManipulator,
    };

    pub use daedalus_middleware::{
        Authorizer, BodyValidation, LoggedInAuthorizer, RoleAuthorizer, Route,
    };

    pub use daedalus_tasks::{
        FnProcessor, JobEntry, Processor, QueueManager, TaskError, TaskResult,
    };

    pub use daedalus_config::{ConfigLoader, DaedalusConfig};
}
