//! Job identifiers and their storage paths.
//!
//! Identifiers look like `2026-10-19-14-03-55_0192b7c2d5e07c3a9f1b2c3d4e5f6a7b`:
//! a UTC timestamp for human sorting, then a UUID v7 in simple form for
//! uniqueness. A path is an identifier under a prefix that is either empty
//! or ends in exactly one `/`.

use crate::error::{TaskError, TaskResult};
use chrono::Utc;
use uuid::Uuid;

/// Generates a fresh job identifier.
pub fn generate_id() -> String {
    format!(
        "{}_{}",
        Utc::now().format("%Y-%m-%d-%H-%M-%S"),
        Uuid::now_v7().simple()
    )
}

/// Returns the storage path for an identifier.
///
/// ```
/// use daedalus_tasks::identity::id_to_path;
///
/// assert_eq!(id_to_path(Some("jobs"), "abc"), "jobs/abc");
/// assert_eq!(id_to_path(Some("jobs/"), "abc"), "jobs/abc");
/// assert_eq!(id_to_path(None, "abc"), "abc");
/// ```
pub fn id_to_path(prefix: Option<&str>, id: &str) -> String {
    format!("{}{id}", normalize_prefix(prefix))
}

/// Recovers the identifier from a storage path.
///
/// # Errors
///
/// Returns [`TaskError::InvalidJobPath`] if `path` is not under `prefix`.
pub fn path_to_id(prefix: Option<&str>, path: &str) -> TaskResult<String> {
    let prefix = normalize_prefix(prefix);
    path.strip_prefix(&prefix)
        .map(ToString::to_string)
        .ok_or_else(|| TaskError::InvalidJobPath {
            prefix,
            path: path.to_string(),
        })
}

fn normalize_prefix(prefix: Option<&str>) -> String {
    match prefix.map(|p| p.trim_end_matches('/')) {
        None | Some("") => String::new(),
        Some(p) => format!("{p}/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_id_shape() {
        let id = generate_id();
        let (stamp, uuid) = id.split_once('_').unwrap();
        assert_eq!(stamp.len(), "2026-01-01-00-00-00".len());
        assert_eq!(uuid.len(), 32);
        assert!(uuid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_round_trip_known_prefixes() {
        for prefix in [None, Some(""), Some("test"), Some("test/")] {
            let id = generate_id();
            let path = id_to_path(prefix, &id);
            assert_eq!(path_to_id(prefix, &path).unwrap(), id);
        }
    }

    #[test]
    fn test_prefix_gets_single_separator() {
        assert_eq!(id_to_path(Some("test///"), "x"), "test/x");
        assert_eq!(id_to_path(Some(""), "x"), "x");
    }

    #[test]
    fn test_path_outside_prefix() {
        let error = path_to_id(Some("jobs"), "other/abc").unwrap_err();
        assert!(matches!(error, TaskError::InvalidJobPath { .. }));
    }

    proptest! {
        #[test]
        fn prop_round_trip(prefix in proptest::option::of("[a-z]{0,8}/?"), id in "[a-z0-9_-]{1,40}") {
            let path = id_to_path(prefix.as_deref(), &id);
            prop_assert_eq!(path_to_id(prefix.as_deref(), &path).unwrap(), id);
        }
    }
}
