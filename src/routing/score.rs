//! Pattern scoring.
//!
//! # Responsibilities
//! - Walk a route pattern against a segmented URL path
//! - Accumulate a coverage score and extract `:name` captures
//!
//! # Design Decisions
//! - Literal segments are worth 1.0, captures 0.75, wildcards 0.5, so a
//!   score of exactly 100 can only mean an all-literal full match and the
//!   caller may short-circuit on it
//! - A literal mismatch or a missing URL segment stops the walk with no
//!   further credit; a URL shorter than the pattern is structurally
//!   penalized because unvisited pattern segments contribute nothing

use std::collections::HashMap;

use super::segments;

/// Parameters captured from `:name` pattern segments.
pub type Params = HashMap<String, String>;

/// Score a route pattern against already-segmented URL path.
///
/// Returns the coverage percentage (`matches / pattern_len * 100`) and any
/// captured params. An empty pattern or a walk that matched nothing scores 0.
pub fn score(url_segments: &[&str], pattern: &str) -> (f64, Params) {
    let pattern_segments = segments(pattern);
    let mut matches = 0.0_f64;
    let mut params = Params::new();

    for (i, pattern_segment) in pattern_segments.iter().enumerate() {
        // Wildcards match nothing in particular and never stop the walk,
        // even past the end of the URL.
        if pattern_segment.starts_with('*') {
            matches += 0.5;
            continue;
        }

        let Some(url_segment) = url_segments.get(i) else {
            break;
        };

        if let Some(name) = pattern_segment.strip_prefix(':') {
            matches += 0.75;
            params.insert(name.to_string(), (*url_segment).to_string());
            continue;
        }

        if pattern_segment != url_segment {
            break;
        }
        matches += 1.0;
    }

    let score = if matches > 0.0 && !pattern_segments.is_empty() {
        matches / pattern_segments.len() as f64 * 100.0
    } else {
        0.0
    };

    (score, params)
}
