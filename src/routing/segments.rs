//! Path segmentation.

/// Split a path into its non-empty `/`-delimited segments.
///
/// Leading, trailing and repeated slashes are ignored, so `/a//b/` and
/// `a/b` both yield `["a", "b"]`. Pure and total: there is no failure mode.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
