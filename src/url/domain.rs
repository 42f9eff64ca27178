use url::Url;

/// Extracts the lower-cased host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mirror::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Same-host policy check
///
/// Only the hostname is compared; scheme and port may differ.
pub fn is_same_host(url: &Url, seed_host: &str) -> bool {
    extract_domain(url).is_some_and(|host| host == seed_host.to_lowercase())
}
