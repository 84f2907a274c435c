//! Route authorizers.
//!
//! An [`Authorizer`] decides whether an authenticated caller may use a route.
//! It only runs once the authorization stage holds a decoded token.

use crate::route::Route;
use daedalus_core::{BoxFuture, InboundRequest, Token};

/// Pass/fail decision for an authenticated caller.
pub trait Authorizer: Send + Sync + 'static {
    /// Returns `true` if `token` may use `route` for `request`.
    fn authorize<'a>(
        &'a self,
        token: &'a Token,
        request: &'a InboundRequest,
        route: &'a Route,
    ) -> BoxFuture<'a, bool>;
}

/// Admits any caller holding a valid token.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggedInAuthorizer;

impl Authorizer for LoggedInAuthorizer {
    fn authorize<'a>(
        &'a self,
        _token: &'a Token,
        _request: &'a InboundRequest,
        _route: &'a Route,
    ) -> BoxFuture<'a, bool> {
        Box::pin(async { true })
    }
}

/// Admits callers by role.
///
/// The token must hold at least one of `required_any` (when non-empty) and
/// every role in `required_all`.
///
/// # Example
///
/// ```
/// use daedalus_middleware::RoleAuthorizer;
///
/// let users = RoleAuthorizer::new(["USER"], Vec::<String>::new());
/// let admins = RoleAuthorizer::new(Vec::<String>::new(), ["USER", "ADMIN"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoleAuthorizer {
    required_any: Vec<String>,
    required_all: Vec<String>,
}

impl RoleAuthorizer {
    /// Creates a role authorizer.
    #[must_use]
    pub fn new<A, B>(required_any: A, required_all: B) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            required_any: required_any.into_iter().map(Into::into).collect(),
            required_all: required_all.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluates the role requirement against a token.
    #[must_use]
    pub fn permits(&self, token: &Token) -> bool {
        let any = self.required_any.is_empty()
            || self.required_any.iter().any(|role| token.has_role(role));
        let all = self.required_all.iter().all(|role| token.has_role(role));
        any && all
    }
}

impl Authorizer for RoleAuthorizer {
    fn authorize<'a>(
        &'a self,
        token: &'a Token,
        _request: &'a InboundRequest,
        _route: &'a Route,
    ) -> BoxFuture<'a, bool> {
        let permitted = self.permits(token);
        if !permitted {
            tracing::debug!(
                sub = token.sub.as_deref().unwrap_or("-"),
                required_any = ?self.required_any,
                required_all = ?self.required_all,
                "role requirement not met"
            );
        }
        Box::pin(async move { permitted })
    }
}

/// An authorizer built from a synchronous closure.
pub struct FnAuthorizer<F> {
    func: F,
}

impl<F> FnAuthorizer<F> {
    /// Creates a closure-based authorizer.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Authorizer for FnAuthorizer<F>
where
    F: Fn(&Token, &InboundRequest) -> bool + Send + Sync + 'static,
{
    fn authorize<'a>(
        &'a self,
        token: &'a Token,
        request: &'a InboundRequest,
        _route: &'a Route,
    ) -> BoxFuture<'a, bool> {
        let permitted = (self.func)(token, request);
        Box::pin(async move { permitted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn route() -> Route {
        Route::new(|_| async { Ok("ok") })
    }

    #[test]
    fn test_role_any_of() {
        let auth = RoleAuthorizer::new(["USER", "ADMIN"], Vec::<String>::new());
        assert!(auth.permits(&Token::new("u").with_role("USER")));
        assert!(auth.permits(&Token::new("u").with_role("ADMIN")));
        assert!(!auth.permits(&Token::new("u").with_role("GUEST")));
        assert!(!auth.permits(&Token::new("u")));
    }

    #[test]
    fn test_role_all_of() {
        let auth = RoleAuthorizer::new(Vec::<String>::new(), ["USER", "ADMIN"]);
        assert!(auth.permits(&Token::new("u").with_role("USER").with_role("ADMIN")));
        assert!(!auth.permits(&Token::new("u").with_role("USER")));
    }

    #[test]
    fn test_no_requirements_permits_everyone() {
        assert!(RoleAuthorizer::default().permits(&Token::default()));
    }

    #[tokio::test]
    async fn test_logged_in_authorizer() {
        let request = InboundRequest::new(Method::GET, "/");
        assert!(
            LoggedInAuthorizer
                .authorize(&Token::default(), &request, &route())
                .await
        );
    }

    #[tokio::test]
    async fn test_fn_authorizer() {
        let auth = FnAuthorizer::new(|token: &Token, request: &InboundRequest| {
            token.sub.as_deref() == request.path_parameter("owner")
        });
        let request =
            InboundRequest::new(Method::GET, "/").with_path_parameter("owner", "alice");
        assert!(auth.authorize(&Token::new("alice"), &request, &route()).await);
        assert!(!auth.authorize(&Token::new("bob"), &request, &route()).await);
    }
}
