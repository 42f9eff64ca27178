//! HTML link extraction
//!
//! Two extraction modes:
//! - Regular pages: every `<a href>` element, parsed with `scraper`
//! - Directory-listing pages ("Index of /..."): a targeted regex over the
//!   raw markup that keeps only entries below the listed directory
//!
//! All returned links are absolute, resolved against the response's final
//! URL. Host filtering and normalization happen in the dispatcher.

use crate::output::has_known_extension;
use crate::url::resolve_link;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Marker identifying auto-generated directory listings
pub const DIRECTORY_LISTING_MARKER: &str = "Index of /";

fn listing_href_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#)
            .expect("directory listing regex is valid")
    })
}

/// Returns true if the body looks like a server-generated directory index
pub fn is_directory_listing(body: &str) -> bool {
    body.contains(DIRECTORY_LISTING_MARKER)
}

/// Extracts every anchor's href, resolved against `base_url`
///
/// # Example
///
/// ```
/// use site_mirror::crawler::extract_anchor_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_anchor_links(html, &base_url);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_anchor_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Extracts entries from a directory-listing page
///
/// Column-sort links (`?C=N;O=D`) and links leaving the listed directory
/// (parent directory, absolute links elsewhere on the site) are skipped.
pub fn extract_listing_links(body: &str, base_url: &Url) -> Vec<Url> {
    let base_dir = listing_directory(base_url);

    listing_href_regex()
        .captures_iter(body)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str())
        .filter(|href| !href.starts_with('?'))
        .filter_map(|href| resolve_link(href, &directory_base(base_url)))
        .filter(|url| {
            let path = url.path();
            path.starts_with(&base_dir) && path.len() > base_dir.len()
        })
        .collect()
}

/// Extracts links from an HTML body, picking the mode from its content
pub fn extract_links(body: &str, base_url: &Url) -> Vec<Url> {
    if is_directory_listing(body) {
        extract_listing_links(body, base_url)
    } else {
        extract_anchor_links(body, base_url)
    }
}

/// Directory path of a listing URL, always ending in `/`
///
/// A last segment with a known file extension (`/files/index.html`) names the
/// index document, so the listing is its parent directory.
fn listing_directory(url: &Url) -> String {
    let path = url.path();
    if path.ends_with('/') {
        return path.to_string();
    }
    match path.rsplit_once('/') {
        Some((parent, last)) if has_known_extension(last) => format!("{}/", parent),
        _ => format!("{}/", path),
    }
}

/// Listing pages are often fetched without their trailing slash; relative
/// entries must still resolve inside the directory
fn directory_base(url: &Url) -> Url {
    let mut base = url.clone();
    let dir = listing_directory(url);
    base.set_path(&dir);
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn strings(links: Vec<Url>) -> Vec<String> {
        links.into_iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let links = extract_anchor_links(html, &base_url());
        assert_eq!(strings(links), vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        let links = extract_anchor_links(html, &base_url());
        assert_eq!(strings(links), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let base = Url::parse("https://example.com/blog/").unwrap();
        let html = r#"<html><body><a href="post1">Link</a></body></html>"#;
        let links = extract_anchor_links(html, &base);
        assert_eq!(strings(links), vec!["https://example.com/blog/post1"]);
    }

    #[test]
    fn test_skip_special_links() {
        let html = r##"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="#section">Jump</a>
            <a href="/valid">Valid</a>
        </body></html>"##;
        let links = extract_anchor_links(html, &base_url());
        assert_eq!(strings(links), vec!["https://example.com/valid"]);
    }

    #[test]
    fn test_download_links_are_kept() {
        let html = r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#;
        let links = extract_anchor_links(html, &base_url());
        assert_eq!(strings(links), vec!["https://example.com/file.pdf"]);
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let html = r#"<html><body><a name="top">Top</a><a href="/a">A</a></body></html>"#;
        assert_eq!(extract_anchor_links(html, &base_url()).len(), 1);
    }

    #[test]
    fn test_detect_directory_listing() {
        assert!(is_directory_listing(
            "<html><head><title>Index of /files</title></head></html>"
        ));
        assert!(!is_directory_listing("<html><body>Hello</body></html>"));
    }

    #[test]
    fn test_listing_links() {
        let body = r#"<html><head><title>Index of /files</title></head><body>
            <h1>Index of /files</h1>
            <pre><a href="?C=N;O=D">Name</a> <a href="?C=M;O=A">Last modified</a>
            <a href="/">Parent Directory</a>
            <a href="../">Up</a>
            <a href="report.pdf">report.pdf</a>
            <a href='sub/'>sub/</a>
            <A HREF="notes.txt">notes.txt</A>
            </pre></body></html>"#;
        let base = Url::parse("https://example.com/files").unwrap();
        let links = extract_listing_links(body, &base);
        assert_eq!(
            strings(links),
            vec![
                "https://example.com/files/report.pdf",
                "https://example.com/files/sub/",
                "https://example.com/files/notes.txt",
            ]
        );
    }

    #[test]
    fn test_listing_served_from_index_file() {
        let body = r#"<title>Index of /files</title>
            <a href="../">Up</a><a href="a.txt">a.txt</a><a href="sub/">sub/</a>"#;
        let base = Url::parse("https://example.com/files/index.html").unwrap();
        assert_eq!(
            strings(extract_listing_links(body, &base)),
            vec![
                "https://example.com/files/a.txt",
                "https://example.com/files/sub/",
            ]
        );
    }

    #[test]
    fn test_extract_links_picks_mode() {
        let listing = r#"<title>Index of /d/</title><a href="?C=S;O=A">Size</a><a href="x.txt">x</a>"#;
        let base = Url::parse("https://example.com/d/").unwrap();
        assert_eq!(
            strings(extract_links(listing, &base)),
            vec!["https://example.com/d/x.txt"]
        );

        let page = r#"<a href="/elsewhere">e</a>"#;
        assert_eq!(
            strings(extract_links(page, &base)),
            vec!["https://example.com/elsewhere"]
        );
    }
}
