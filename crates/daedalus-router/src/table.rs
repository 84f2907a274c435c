//! Ordered route table.

use crate::params::Params;
use crate::pattern::{PathPattern, PatternError};
use http::Method;

/// A matched route and the parameters extracted from the path.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    /// The value registered with the route.
    pub route: &'a T,
    /// The pattern that matched.
    pub pattern: &'a str,
    /// Parameters captured by the pattern.
    pub params: Params,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    method: Method,
    pattern: PathPattern,
    value: T,
}

/// An ordered list of `(method, pattern, value)` routes.
///
/// Lookups scan routes in registration order and return the first one whose
/// method (compared case-insensitively) and pattern both match. Registration
/// order is therefore match priority: a literal route that overlaps a
/// parameterized one must be registered first to be reachable.
///
/// # Example
///
/// ```rust
/// use daedalus_router::RouteTable;
/// use http::Method;
///
/// let mut table = RouteTable::new();
/// table.add(Method::GET, "/multi/fixed", "fixed").unwrap();
/// table.add(Method::GET, "/multi/{v}", "variable").unwrap();
///
/// let m = table.find(&Method::GET, "multi/fixed").unwrap();
/// assert_eq!(*m.route, "fixed");
///
/// let m = table.find(&Method::GET, "multi/other").unwrap();
/// assert_eq!(*m.route, "variable");
/// assert_eq!(m.params.get("v"), Some("other"));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> RouteTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route. Earlier routes take priority over later ones.
    pub fn add(&mut self, method: Method, pattern: &str, value: T) -> Result<(), PatternError> {
        let pattern = PathPattern::parse(pattern)?;
        self.entries.push(Entry {
            method,
            pattern,
            value,
        });
        Ok(())
    }

    /// Finds the first route matching a normalized path.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        self.entries
            .iter()
            .filter(|entry| same_method(&entry.method, method))
            .find_map(|entry| {
                entry.pattern.matches(path).map(|params| RouteMatch {
                    route: &entry.value,
                    pattern: entry.pattern.as_str(),
                    params,
                })
            })
    }

    /// Finds a route by its registered method and pattern text.
    #[must_use]
    pub fn find_route(&self, method: &Method, pattern: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|entry| same_method(&entry.method, method) && entry.pattern.as_str() == pattern)
            .map(|entry| &entry.value)
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(method, pattern, value)` in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &str, &T)> {
        self.entries
            .iter()
            .map(|entry| (&entry.method, entry.pattern.as_str(), &entry.value))
    }
}

fn same_method(a: &Method, b: &Method) -> bool {
    a.as_str().eq_ignore_ascii_case(b.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<&'static str> {
        let mut table = RouteTable::new();
        table.add(Method::GET, "/", "root").unwrap();
        table.add(Method::GET, "/meta/server", "server").unwrap();
        table.add(Method::GET, "/meta/item/{itemId}", "item").unwrap();
        table.add(Method::POST, "/meta/item/{itemId}", "update").unwrap();
        table.add(Method::GET, "/multi/fixed", "fixed").unwrap();
        table.add(Method::GET, "/multi/{v}", "variable").unwrap();
        table
    }

    #[test]
    fn test_find_literal() {
        let table = table();
        let m = table.find(&Method::GET, "meta/server").unwrap();
        assert_eq!(*m.route, "server");
        assert_eq!(m.pattern, "/meta/server");
        assert!(m.params.is_empty());
    }

    #[test]
    fn test_find_root() {
        assert_eq!(*table().find(&Method::GET, "").unwrap().route, "root");
    }

    #[test]
    fn test_method_selects_route() {
        let table = table();
        assert_eq!(*table.find(&Method::GET, "meta/item/1").unwrap().route, "item");
        assert_eq!(*table.find(&Method::POST, "meta/item/1").unwrap().route, "update");
        assert!(table.find(&Method::DELETE, "meta/item/1").is_none());
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let lower = Method::from_bytes(b"get").unwrap();
        assert_eq!(*table().find(&lower, "meta/server").unwrap().route, "server");
    }

    #[test]
    fn test_first_match_wins() {
        let table = table();
        assert_eq!(*table.find(&Method::GET, "multi/fixed").unwrap().route, "fixed");

        let mut reversed = RouteTable::new();
        reversed.add(Method::GET, "/multi/{v}", "variable").unwrap();
        reversed.add(Method::GET, "/multi/fixed", "fixed").unwrap();
        assert_eq!(
            *reversed.find(&Method::GET, "multi/fixed").unwrap().route,
            "variable"
        );
    }

    #[test]
    fn test_no_match() {
        assert!(table().find(&Method::GET, "does/not/exist").is_none());
    }

    #[test]
    fn test_find_route_by_pattern() {
        let table = table();
        assert_eq!(table.find_route(&Method::GET, "/multi/{v}"), Some(&"variable"));
        assert_eq!(table.find_route(&Method::PUT, "/multi/{v}"), None);
        assert_eq!(table.len(), 6);
        assert_eq!(table.iter().next().map(|(_, p, _)| p), Some("/"));
    }

    #[test]
    fn test_add_rejects_bad_pattern() {
        let mut table = RouteTable::new();
        assert!(table.add(Method::GET, "/x/{}", ()).is_err());
        assert!(table.is_empty());
    }
}
