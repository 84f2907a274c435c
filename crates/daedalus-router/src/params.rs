//! Path parameters extracted by a route match.
//!
//! Most routes carry one or two parameters, so values are kept inline in a
//! small vector and only spill to the heap for unusually wide patterns.

use smallvec::SmallVec;
use std::collections::HashMap;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Parameters extracted from a matched path, in pattern order.
///
/// # Example
///
/// ```rust
/// use daedalus_router::Params;
/// use std::collections::HashMap;
///
/// let mut params = Params::new();
/// params.push("itemId", "42");
///
/// let mut existing = HashMap::from([("itemId".to_string(), "old".to_string())]);
/// params.merge_into(&mut existing);
/// assert_eq!(existing["itemId"], "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Merges these parameters into an existing map.
    ///
    /// Extracted values replace existing entries with the same name.
    pub fn merge_into(&self, target: &mut HashMap<String, String>) {
        for (name, value) in &self.inner {
            target.insert(name.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
