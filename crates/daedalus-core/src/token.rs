//! Caller tokens and the token manipulator boundary.
//!
//! Token cryptography lives outside this crate. A [`TokenManipulator`] turns
//! a request's credential material into a decoded [`Token`]; the
//! authorization stage only ever sees the decoded form.

use crate::request::InboundRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decoded claims of a caller's credential.
///
/// Lifetime is a single request. Unknown claims are kept in [`Token::claims`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Subject (user id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Roles granted to the subject.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Remaining claims.
    #[serde(flatten)]
    pub claims: serde_json::Map<String, serde_json::Value>,
}

impl Token {
    /// Creates a token for the given subject.
    #[must_use]
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: Some(sub.into()),
            ..Self::default()
        }
    }

    /// Adds a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Adds a free-form claim.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.claims.insert(name.into(), value);
        self
    }

    /// Returns `true` if the token carries `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Extracts caller tokens from requests.
pub trait TokenManipulator: Send + Sync + 'static {
    /// Decodes the request's credential, returning `None` when it is
    /// missing or invalid.
    fn extract_token_from_request(&self, request: &InboundRequest) -> Option<Token>;

    /// Returns the raw credential string as sent by the caller.
    fn extract_raw_token_string(&self, request: &InboundRequest) -> Option<String> {
        bearer_token(request).map(ToString::to_string)
    }
}

/// Returns the bearer token from the `Authorization` header.
///
/// The scheme is matched case-insensitively.
#[must_use]
pub fn bearer_token(request: &InboundRequest) -> Option<&str> {
    let value = request.header("authorization")?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// A token manipulator backed by a fixed table of raw token strings.
///
/// Intended for local runs and tests where no signing key is available.
///
/// # Example
///
/// ```
/// use daedalus_core::{InboundRequest, StaticTokenManipulator, Token, TokenManipulator};
/// use http::Method;
///
/// let tokens = StaticTokenManipulator::new()
///     .with_token("abc", Token::new("user-1").with_role("USER"));
///
/// let request = InboundRequest::new(Method::GET, "/").with_header("authorization", "Bearer abc");
/// let token = tokens.extract_token_from_request(&request).unwrap();
/// assert!(token.has_role("USER"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTokenManipulator {
    tokens: HashMap<String, Token>,
}

impl StaticTokenManipulator {
    /// Creates an empty manipulator; every request is unauthenticated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a raw token string and its decoded form.
    #[must_use]
    pub fn with_token(mut self, raw: impl Into<String>, token: Token) -> Self {
        self.tokens.insert(raw.into(), token);
        self
    }
}

impl TokenManipulator for StaticTokenManipulator {
    fn extract_token_from_request(&self, request: &InboundRequest) -> Option<Token> {
        bearer_token(request).and_then(|raw| self.tokens.get(raw).cloned())
    }
}
