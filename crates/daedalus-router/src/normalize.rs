//! Path normalization ahead of route matching.

/// Strips leading separators and the deployment stage from a raw path.
///
/// The steps are:
///
/// 1. strip every leading `/`;
/// 2. strip `stage` if the path starts with it; otherwise, when a stage was
///    reported, strip `custom_stage` if the path starts with that;
/// 3. strip every leading `/` again.
///
/// Stages are plain prefixes, so stage `v1` turns `v1beta/x` into `beta/x`.
/// The custom stage is only consulted when the transport reported a stage.
/// Empty stage strings are ignored.
///
/// # Example
///
/// ```rust
/// use daedalus_router::normalize_path;
///
/// assert_eq!(normalize_path("/v1/meta/server", Some("v1"), None), "meta/server");
/// assert_eq!(normalize_path("//api/items", Some("v1"), Some("api")), "items");
/// assert_eq!(normalize_path("/items", None, None), "items");
/// ```
#[must_use]
pub fn normalize_path(path: &str, stage: Option<&str>, custom_stage: Option<&str>) -> String {
    let trimmed = path.trim_start_matches('/');

    let custom_stage = custom_stage.filter(|s| !s.is_empty());

    let without_stage = match stage.filter(|s| !s.is_empty()) {
        Some(stage) => trimmed
            .strip_prefix(stage)
            .or_else(|| custom_stage.and_then(|custom| trimmed.strip_prefix(custom)))
            .unwrap_or(trimmed),
        None => trimmed,
    };

    without_stage.trim_start_matches('/').to_string()
}
