//! Mapping from URLs to mirrored file paths
//!
//! `https://example.com/blog/post1` maps to
//! `<root>/example.com/blog/post1/index.html`; a final segment with a known
//! extension (`/doc.pdf`, `/feed.xml`) is kept as the file name.

use std::path::{Path, PathBuf};
use url::Url;

/// Extensions kept verbatim as the artifact's file name
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "html", "htm", "pdf", "xml", "json", "js", "css", "txt", "md", "csv", "svg", "rss", "atom",
];

/// File name used for HTML resources without a file segment
pub const HTML_INDEX: &str = "index.html";

/// File name used for API resources without a file segment
pub const JSON_INDEX: &str = "index.json";

/// Returns true if the segment ends in one of [`KNOWN_EXTENSIONS`]
pub fn has_known_extension(segment: &str) -> bool {
    Path::new(segment)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            KNOWN_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Computes the artifact path for `url` under `root`
///
/// The host (with `_port` when a non-default port is present) is the top
/// directory and every path segment becomes a nested directory. When the
/// last segment is missing or has no known extension, `default_file` is
/// appended.
pub fn artifact_path(root: &Path, url: &Url, default_file: &str) -> PathBuf {
    let host = url.host_str().unwrap_or("unknown-host").to_lowercase();
    let host_dir = match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host,
    };

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty() && *s != "." && *s != "..")
                .map(sanitize_segment)
                .collect()
        })
        .unwrap_or_default();

    let mut path = root.join(sanitize_segment(&host_dir));
    for segment in &segments {
        path.push(segment);
    }

    let has_file = segments
        .last()
        .is_some_and(|last| has_known_extension(last));
    if !has_file {
        path.push(default_file);
    }

    path
}

/// Replaces characters that are not portable in file names
fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(url: &str) -> PathBuf {
        artifact_path(Path::new("out"), &Url::parse(url).unwrap(), HTML_INDEX)
    }

    #[test]
    fn test_root_maps_to_index() {
        assert_eq!(
            map("https://example.com/"),
            PathBuf::from("out/example.com/index.html")
        );
        assert_eq!(
            map("https://example.com"),
            PathBuf::from("out/example.com/index.html")
        );
    }

    #[test]
    fn test_directory_like_path() {
        assert_eq!(
            map("https://example.com/blog/post1"),
            PathBuf::from("out/example.com/blog/post1/index.html")
        );
        assert_eq!(
            map("https://example.com/blog/"),
            PathBuf::from("out/example.com/blog/index.html")
        );
    }

    #[test]
    fn test_known_extension_kept() {
        assert_eq!(
            map("https://example.com/docs/doc.pdf"),
            PathBuf::from("out/example.com/docs/doc.pdf")
        );
        assert_eq!(
            map("https://example.com/feed.XML"),
            PathBuf::from("out/example.com/feed.XML")
        );
        assert_eq!(
            map("https://example.com/page.html"),
            PathBuf::from("out/example.com/page.html")
        );
    }

    #[test]
    fn test_unknown_extension_gets_index() {
        assert_eq!(
            map("https://example.com/v1.2/release"),
            PathBuf::from("out/example.com/v1.2/release/index.html")
        );
        assert_eq!(
            map("https://example.com/archive.tar"),
            PathBuf::from("out/example.com/archive.tar/index.html")
        );
    }

    #[test]
    fn test_port_in_host_dir() {
        assert_eq!(
            map("http://127.0.0.1:8080/a"),
            PathBuf::from("out/127.0.0.1_8080/a/index.html")
        );
    }

    #[test]
    fn test_json_default_file() {
        let url = Url::parse("https://api.github.com/repos/o/r/contents/src").unwrap();
        assert_eq!(
            artifact_path(Path::new("out"), &url, JSON_INDEX),
            PathBuf::from("out/api.github.com/repos/o/r/contents/src/index.json")
        );
    }

    #[test]
    fn test_has_known_extension() {
        assert!(has_known_extension("a.PDF"));
        assert!(has_known_extension("style.css"));
        assert!(!has_known_extension("README"));
        assert!(!has_known_extension("photo.jpeg"));
    }
}
