//! Ordered route table for Daedalus.
//!
//! This crate resolves a request path and method to a registered route.
//! Routes are kept in registration order and matched first-match-wins, so
//! callers encode priority by the order they register overlapping patterns.
//!
//! # Features
//!
//! - **Path Normalization**: Strip leading separators and the deployment stage
//! - **Path Parameters**: `{name}` and `:name` capture one segment
//! - **Wildcards**: `*name` captures the rest of the path
//! - **Case-Insensitive Methods**: `get` and `GET` select the same routes
//!
//! # Example
//!
//! ```rust
//! use daedalus_router::{normalize_path, RouteTable};
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//! table.add(Method::GET, "/meta/item/{itemId}", "getItem").unwrap();
//!
//! let path = normalize_path("/prod/meta/item/42", Some("prod"), None);
//! let m = table.find(&Method::GET, &path).unwrap();
//! assert_eq!(*m.route, "getItem");
//! assert_eq!(m.params.get("itemId"), Some("42"));
//! ```
//!
//! # Lookup
//!
//! ```text
//!   "/prod/meta/item/42"
//!          │ normalize_path
//!          ▼
//!    "meta/item/42"
//!          │ scan in registration order
//!          ▼
//!   GET /            ✗
//!   GET /meta/server ✗
//!   GET /meta/item/{itemId}  ✓  → itemId = "42"
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod normalize;
mod params;
mod pattern;
mod table;

pub use normalize::normalize_path;
pub use params::Params;
pub use pattern::{PathPattern, PatternError};
pub use table::{RouteMatch, RouteTable};
