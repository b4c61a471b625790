//! Exclude filtering with shell-glob patterns.

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled set of exclude patterns.
///
/// Blank patterns are dropped. A pattern that is not a valid glob is matched
/// literally, so building a filter never fails.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<Pattern>,
}

impl ExcludeFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(|p| p.strip_prefix("./").unwrap_or(p))
            .filter_map(|p| Pattern::new(p).or_else(|_| Pattern::new(&Pattern::escape(p))).ok())
            .collect();
        ExcludeFilter { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if `relative_path` matches any pattern.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        let path = relative_path.strip_prefix("./").unwrap_or(relative_path);
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(path, MATCH_OPTIONS))
    }
}

/// One-shot form of [`ExcludeFilter::is_excluded`].
pub fn should_exclude<S: AsRef<str>>(relative_path: &str, patterns: &[S]) -> bool {
    ExcludeFilter::new(patterns).is_excluded(relative_path)
}
