use crate::UrlError;
use std::fmt;
use url::Url;

/// Tracking query parameters removed when no custom list is configured
pub const DEFAULT_TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// A URL in canonical form
///
/// Two URLs that normalize to the same string are treated as the same
/// resource: this is the key of the visited set and the frontier's
/// de-duplication set, and the seed of the on-disk artifact path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Wraps a string that is already known to be canonical
    ///
    /// Used when reading the visited cache back from disk.
    pub fn from_canonical(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the canonical string back into a `Url`
    pub fn to_url(&self) -> Result<Url, UrlError> {
        Url::parse(&self.0).map_err(|e| UrlError::Parse(e.to_string()))
    }

    /// Returns the percent-encoded path, `/` for the site root
    pub fn path(&self) -> String {
        self.to_url()
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| "/".to_string())
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizer carrying the configured list of tracking parameters
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    tracking_params: Vec<String>,
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKING_PARAMS.iter().map(|p| p.to_string()).collect())
    }
}

impl UrlNormalizer {
    pub fn new(tracking_params: Vec<String>) -> Self {
        Self { tracking_params }
    }

    /// Normalizes a URL string into its canonical form
    ///
    /// # Normalization Steps
    ///
    /// 1. Parse the URL; reject if malformed or not HTTP(S)
    /// 2. Lowercase the host, keep an explicit non-default port
    /// 3. Remove dot segments and repeated slashes from the path
    /// 4. Strip trailing slashes (the root path becomes empty)
    /// 5. Drop tracking query parameters, keep the rest in order
    /// 6. Drop the fragment
    ///
    /// # Examples
    ///
    /// ```
    /// use site_mirror::url::UrlNormalizer;
    ///
    /// let normalizer = UrlNormalizer::default();
    /// let url = normalizer.normalize("https://Example.COM/blog/#top").unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/blog");
    /// ```
    pub fn normalize(&self, url_str: &str) -> Result<NormalizedUrl, UrlError> {
        let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
        self.normalize_parsed(&url)
    }

    /// Normalizes an already parsed URL
    pub fn normalize_parsed(&self, url: &Url) -> Result<NormalizedUrl, UrlError> {
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                scheme
            )));
        }

        let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();

        let mut canonical = format!("{}://{}", scheme, host);
        if let Some(port) = url.port() {
            canonical.push_str(&format!(":{}", port));
        }
        canonical.push_str(&normalize_path(url.path()));

        if let Some(query) = url.query() {
            let kept: Vec<&str> = query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .filter(|pair| {
                    let key = pair.split_once('=').map_or(*pair, |(key, _)| key);
                    !self.is_tracking_param(key)
                })
                .collect();
            if !kept.is_empty() {
                canonical.push('?');
                canonical.push_str(&kept.join("&"));
            }
        }

        Ok(NormalizedUrl(canonical))
    }

    fn is_tracking_param(&self, key: &str) -> bool {
        key.starts_with("utm_") || self.tracking_params.iter().any(|p| p == key)
    }
}

/// Normalizes a URL with the default tracking-parameter list
///
/// # Examples
///
/// ```
/// use site_mirror::url::normalize_url;
///
/// let url = normalize_url("https://example.com/blog/").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/blog");
/// ```
pub fn normalize_url(url_str: &str) -> Result<NormalizedUrl, UrlError> {
    UrlNormalizer::default().normalize(url_str)
}

/// Resolves an href found in a document against the document's final URL
///
/// Returns None for links that can never be crawled: empty hrefs,
/// fragment-only anchors, `javascript:`/`mailto:`/`tel:`/`data:` links,
/// unparseable hrefs and non-HTTP(S) targets.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

/// Collapses repeated slashes and strips trailing ones
///
/// Dot segments are already resolved by the `url` parser.
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    if segments.is_empty() {
        return String::new();
    }

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_trailing_slash() {
        let result = normalize_url("https://example.com/page/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_root_path_is_empty() {
        assert_eq!(
            normalize_url("https://example.com/").unwrap().as_str(),
            "https://example.com"
        );
        assert_eq!(
            normalize_url("https://example.com").unwrap().as_str(),
            "https://example.com"
        );
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_scheme_is_preserved() {
        let result = normalize_url("http://example.com/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_port_is_kept() {
        let result = normalize_url("http://127.0.0.1:8080/docs/").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/docs");
    }

    #[test]
    fn test_default_port_is_elided() {
        let result = normalize_url("https://example.com:443/a").unwrap();
        assert_eq!(result.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_remove_tracking_params_keeps_order() {
        let result =
            normalize_url("https://example.com/page?b=2&utm_source=x&a=1&fbclid=9").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?b=2&a=1");
    }

    #[test]
    fn test_all_tracking_params_removed() {
        let result =
            normalize_url("https://example.com/page?utm_source=a&fbclid=b&gclid=c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_empty_query_removed() {
        let result = normalize_url("https://example.com/page?").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_untracked_query_kept_verbatim() {
        let result = normalize_url("https://example.com/files/?C=N;O=D").unwrap();
        assert_eq!(result.as_str(), "https://example.com/files?C=N;O=D");

        let result = normalize_url("https://example.com/list?page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/list?page");

        let result = normalize_url("https://example.com/list?page&utm_campaign=x&&q=a%2Fb").unwrap();
        assert_eq!(result.as_str(), "https://example.com/list?page&q=a%2Fb");
    }

    #[test]
    fn test_custom_tracking_params() {
        let normalizer = UrlNormalizer::new(vec!["session".to_string()]);
        let result = normalizer
            .normalize("https://example.com/page?session=abc&ref=main")
            .unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?ref=main");
    }

    #[test]
    fn test_normalize_path_with_dots() {
        let result = normalize_url("https://example.com/a/../b/./c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_multiple_slashes() {
        let result = normalize_url("https://example.com///path//to///page//").unwrap();
        assert_eq!(result.as_str(), "https://example.com/path/to/page");
    }

    #[test]
    fn test_lowercase_host_keeps_path_case() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://example.com/blog/",
            "https://example.com",
            "http://Example.com:8080//a/./b/../c/?x=1&utm_medium=m&y=a+b#frag",
            "https://example.com/search?q=hello%20world&lang=en",
            "https://example.com/%7Euser/files/",
            "https://example.com/a//",
            "https://example.com/files/?C=M;O=A",
            "https://example.com/list?page&sort",
        ];
        for input in inputs {
            let once = normalize_url(input).unwrap();
            let twice = normalize_url(once.as_str()).unwrap();
            assert_eq!(once, twice, "normalization not idempotent for {}", input);
        }
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_url() {
        let result = normalize_url("not a url");
        assert!(matches!(result.unwrap_err(), UrlError::Parse(_)));
    }

    #[test]
    fn test_path_accessor() {
        let url = normalize_url("https://example.com/blog/post1/").unwrap();
        assert_eq!(url.path(), "/blog/post1");
        let root = normalize_url("https://example.com/").unwrap();
        assert_eq!(root.path(), "/");
    }

    #[test]
    fn test_resolve_relative_link() {
        let base = Url::parse("https://example.com/blog/").unwrap();
        let resolved = resolve_link("post1", &base).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/blog/post1");
    }

    #[test]
    fn test_resolve_absolute_path_link() {
        let base = Url::parse("https://example.com/blog/post1").unwrap();
        let resolved = resolve_link("/about", &base).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/about");
    }

    #[test]
    fn test_resolve_skips_special_schemes() {
        let base = Url::parse("https://example.com/").unwrap();
        assert!(resolve_link("javascript:void(0)", &base).is_none());
        assert!(resolve_link("MAILTO:someone@example.com", &base).is_none());
        assert!(resolve_link("tel:+123", &base).is_none());
        assert!(resolve_link("data:text/plain,hi", &base).is_none());
        assert!(resolve_link("#section", &base).is_none());
        assert!(resolve_link("   ", &base).is_none());
        assert!(resolve_link("ftp://example.com/file", &base).is_none());
    }
}
