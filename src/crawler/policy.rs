//! Request policy applied to every outgoing request
//!
//! A static allow/deny rule set keyed on the resource type inferred from the
//! URL's extension. Images, stylesheets, fonts and media are never fetched.
//! Scripts are optionally refused, except on whitelisted hosts. PDFs are
//! always allowed.

use crate::config::HttpSettings;
use std::path::Path;
use url::Url;

/// Resource type inferred from a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Document,
    Pdf,
    Data,
    Script,
    Stylesheet,
    Image,
    Font,
    Media,
}

impl ResourceType {
    /// Infers the resource type from the last path segment's extension
    ///
    /// URLs without an extension are documents.
    pub fn from_url(url: &Url) -> Self {
        let extension = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|last| Path::new(last).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("js") | Some("mjs") => Self::Script,
            Some("css") => Self::Stylesheet,
            Some("png") | Some("jpg") | Some("jpeg") | Some("gif") | Some("webp") | Some("ico")
            | Some("bmp") | Some("avif") => Self::Image,
            Some("woff") | Some("woff2") | Some("ttf") | Some("otf") | Some("eot") => Self::Font,
            Some("mp3") | Some("mp4") | Some("webm") | Some("ogg") | Some("wav") | Some("mov") => {
                Self::Media
            }
            Some("json") | Some("xml") | Some("txt") | Some("csv") | Some("md") => Self::Data,
            _ => Self::Document,
        }
    }
}

/// Allow/deny rules for outgoing requests
#[derive(Debug, Clone, Default)]
pub struct RequestPolicy {
    block_scripts: bool,
    script_hosts: Vec<String>,
}

impl RequestPolicy {
    pub fn new(block_scripts: bool, script_hosts: Vec<String>) -> Self {
        Self {
            block_scripts,
            script_hosts: script_hosts.into_iter().map(|h| h.to_lowercase()).collect(),
        }
    }

    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self::new(settings.block_scripts, settings.script_hosts.clone())
    }

    /// Returns the resource type if the request must be refused
    pub fn blocked(&self, url: &Url) -> Option<ResourceType> {
        let resource = ResourceType::from_url(url);
        let allowed = match resource {
            ResourceType::Pdf | ResourceType::Document | ResourceType::Data => true,
            ResourceType::Image
            | ResourceType::Stylesheet
            | ResourceType::Font
            | ResourceType::Media => false,
            ResourceType::Script => !self.block_scripts || self.is_script_host(url),
        };

        if allowed {
            None
        } else {
            Some(resource)
        }
    }

    fn is_script_host(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| host.to_lowercase())
            .is_some_and(|host| self.script_hosts.iter().any(|h| *h == host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_resource_type_from_extension() {
        assert_eq!(
            ResourceType::from_url(&url("https://example.com/a/doc.PDF")),
            ResourceType::Pdf
        );
        assert_eq!(
            ResourceType::from_url(&url("https://example.com/app.js")),
            ResourceType::Script
        );
        assert_eq!(
            ResourceType::from_url(&url("https://example.com/logo.png?v=2")),
            ResourceType::Image
        );
        assert_eq!(
            ResourceType::from_url(&url("https://example.com/blog/post")),
            ResourceType::Document
        );
        assert_eq!(
            ResourceType::from_url(&url("https://example.com/")),
            ResourceType::Document
        );
    }

    #[test]
    fn test_blocks_images_styles_fonts() {
        let policy = RequestPolicy::default();
        assert_eq!(
            policy.blocked(&url("https://example.com/a.jpg")),
            Some(ResourceType::Image)
        );
        assert_eq!(
            policy.blocked(&url("https://example.com/site.css")),
            Some(ResourceType::Stylesheet)
        );
        assert_eq!(
            policy.blocked(&url("https://example.com/f.woff2")),
            Some(ResourceType::Font)
        );
    }

    #[test]
    fn test_allows_documents_and_pdf() {
        let policy = RequestPolicy::new(true, vec![]);
        assert_eq!(policy.blocked(&url("https://example.com/page")), None);
        assert_eq!(policy.blocked(&url("https://example.com/doc.pdf")), None);
        assert_eq!(policy.blocked(&url("https://example.com/feed.xml")), None);
    }

    #[test]
    fn test_scripts_allowed_unless_blocked() {
        let open = RequestPolicy::new(false, vec![]);
        assert_eq!(open.blocked(&url("https://example.com/app.js")), None);

        let strict = RequestPolicy::new(true, vec!["CDN.example.com".to_string()]);
        assert_eq!(
            strict.blocked(&url("https://example.com/app.js")),
            Some(ResourceType::Script)
        );
        assert_eq!(strict.blocked(&url("https://cdn.example.com/app.js")), None);
    }
}
