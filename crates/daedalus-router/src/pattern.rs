//! Path pattern parsing and matching.

use crate::params::Params;
use thiserror::Error;

/// Errors raised while parsing a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A parameter segment has no name (`{}`, `:` or `*`).
    #[error("pattern '{pattern}' contains an unnamed parameter")]
    UnnamedParameter {
        /// The offending pattern.
        pattern: String,
    },

    /// A wildcard segment is followed by more segments.
    #[error("pattern '{pattern}' has a wildcard before its last segment")]
    WildcardNotLast {
        /// The offending pattern.
        pattern: String,
    },
}

/// A segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Captures one path segment (`{name}` or `:name`).
    Param(String),
    /// Captures the rest of the path (`*name`).
    Wildcard(String),
}

/// A parsed path pattern such as `/meta/item/{itemId}` or `/files/*rest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parses a pattern.
    ///
    /// Leading, trailing and repeated separators are ignored.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part
                .strip_prefix('{')
                .and_then(|p| p.strip_suffix('}'))
                .or_else(|| part.strip_prefix(':'))
            {
                Segment::Param(named(name, pattern)?)
            } else if let Some(name) = part.strip_prefix('*') {
                if index + 1 != parts.len() {
                    return Err(PatternError::WildcardNotLast {
                        pattern: pattern.to_string(),
                    });
                }
                Segment::Wildcard(named(name, pattern)?)
            } else {
                Segment::Literal((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Returns the pattern as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches a normalized path, returning the captured parameters.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(expected) => {
                    if actual.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.push(name.as_str(), *actual.get(index)?);
                }
                Segment::Wildcard(name) => {
                    let rest = actual.get(index..).unwrap_or_default().join("/");
                    params.push(name.as_str(), rest);
                    return Some(params);
                }
            }
        }

        (actual.len() == self.segments.len()).then_some(params)
    }
}

fn named(name: &str, pattern: &str) -> Result<String, PatternError> {
    if name.is_empty() {
        return Err(PatternError::UnnamedParameter {
            pattern: pattern.to_string(),
        });
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::parse("/meta/server").unwrap();
        assert!(pattern.matches("meta/server").is_some());
        assert!(pattern.matches("meta/server/extra").is_none());
        assert!(pattern.matches("meta").is_none());
        assert!(pattern.matches("Meta/server").is_none());
    }

    #[test]
    fn test_brace_and_colon_params() {
        let braces = PathPattern::parse("/meta/item/{itemId}").unwrap();
        assert_eq!(braces.matches("meta/item/42").unwrap().get("itemId"), Some("42"));

        let colon = PathPattern::parse("users/:id/posts/:post").unwrap();
        let params = colon.matches("users/7/posts/9").unwrap();
        assert_eq!(params.get("id"), Some("7"));
        assert_eq!(params.get("post"), Some("9"));
    }

    #[test]
    fn test_wildcard_captures_rest() {
        let pattern = PathPattern::parse("/files/*path").unwrap();
        assert_eq!(
            pattern.matches("files/a/b/c.txt").unwrap().get("path"),
            Some("a/b/c.txt")
        );
        assert_eq!(pattern.matches("files").unwrap().get("path"), Some(""));
        assert!(pattern.matches("other/a").is_none());
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.matches("").is_some());
        assert!(pattern.matches("x").is_none());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathPattern::parse("/items/{}"),
            Err(PatternError::UnnamedParameter { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/files/*rest/more"),
            Err(PatternError::WildcardNotLast { .. })
        ));
    }
}
