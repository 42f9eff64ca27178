use crate::url::NormalizedUrl;

/// Operator-supplied exclusion patterns
///
/// A pattern is a literal, case-sensitive substring. A URL is excluded when
/// any pattern occurs in its path; scheme, host and query are never
/// inspected. Blank patterns are discarded so an empty ignore line cannot
/// exclude the whole site.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    patterns: Vec<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.trim().is_empty())
            .collect();
        Self { patterns }
    }

    /// Checks a normalized URL against the pattern list
    ///
    /// # Examples
    ///
    /// ```
    /// use site_mirror::url::{normalize_url, ExclusionFilter};
    ///
    /// let filter = ExclusionFilter::new(["/private"]);
    /// assert!(filter.matches(&normalize_url("https://example.com/private/a").unwrap()));
    /// assert!(!filter.matches(&normalize_url("https://private.example.com/a").unwrap()));
    /// ```
    pub fn matches(&self, url: &NormalizedUrl) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        matches_path(&url.path(), &self.patterns)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Returns true if any pattern is a substring of `path`
pub fn matches_path(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| path.contains(pattern.as_str()))
}
