//! # Daedalus Core
//!
//! Core types and collaborator traits for the Daedalus dispatcher.
//!
//! - [`InboundRequest`] / [`Response`] - Transport-neutral request and response
//! - [`DispatchError`] - Failure taxonomy shared by every dispatch stage
//! - [`Token`] / [`TokenManipulator`] - Caller credentials boundary
//! - [`ModelValidator`] - Named-model validation boundary
//! - [`BoxFuture`] - Boxed future used by object-safe async traits

#![doc(html_root_url = "https://docs.rs/daedalus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod request;
mod response;
mod token;
mod validator;

use std::future::Future;
use std::pin::Pin;

pub use error::{
    DispatchError, DispatchResult, ErrorCategory, ErrorEnvelope, DEFAULT_ERROR_MESSAGE,
    NO_SUCH_ENDPOINT,
};
pub use request::{InboundRequest, RequestId};
pub use response::{IntoResponse, Response, ResponseExt};
pub use token::{bearer_token, StaticTokenManipulator, Token, TokenManipulator};
pub use validator::{FieldType, ModelSchema, ModelValidator, SchemaModelValidator};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
