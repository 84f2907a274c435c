//! # Daedalus Middleware
//!
//! The request dispatch pipeline for Daedalus.
//!
//! ## Pipeline
//!
//! ```text
//! Request → Normalize → Match → Authorization → Validation → Handler
//!                                                              ↓
//! Response ← CORS + Request ID ← Error Envelope ←──────────────┘
//! ```
//!
//! | Step          | Failure          | Status |
//! |---------------|------------------|--------|
//! | Match         | `NotFound`       | 404    |
//! | Authorization | `Unauthorized`   | 401    |
//! | Authorization | `Forbidden`      | 403    |
//! | Validation    | `BadRequest`     | 400    |
//! | Any stage     | `Misconfigured`  | 500    |
//! | Handler       | any / panic      | varies |
//!
//! `OPTIONS` requests are answered with a canned preflight response when
//! CORS is enabled.
//!
//! ## Example
//!
//! ```
//! use daedalus_core::InboundRequest;
//! use daedalus_middleware::{Dispatcher, Route};
//! use http::Method;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let dispatcher = Dispatcher::builder()
//!     .route(
//!         Method::GET,
//!         "/multi/{v}",
//!         Route::new(|request| async move {
//!             Ok(json!({"v": request.path_parameter("v")}))
//!         }),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let response = dispatcher
//!     .dispatch(InboundRequest::new(Method::GET, "/multi/abc"))
//!     .await;
//! assert_eq!(response.status(), 200);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod authorizer;
pub mod dispatcher;
pub mod route;
pub mod stages;

pub use authorizer::{Authorizer, FnAuthorizer, LoggedInAuthorizer, RoleAuthorizer};
pub use dispatcher::{DispatchConfig, Dispatcher, DispatcherBuilder, DEFAULT_TIMEOUT};
pub use route::{BodyValidation, BoxedHandler, Route};
pub use stages::{
    AuthorizationStage, CorsPolicy, CorsValue, RequestIdPolicy, Stage, ValidationStage,
};
