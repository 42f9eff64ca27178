//! Page fetcher implementation
//!
//! This module defines the single-attempt fetch capability used by the
//! crawler:
//! - The `PageFetcher` trait, the seam between the crawl loop and the network
//! - Building the HTTP client with user agent, extra headers and timeouts
//! - The reqwest-backed `HttpPageFetcher`, which applies the request policy
//!   and classifies failures
//!
//! Retries live one level up, in [`crate::crawler::RetryingFetcher`].

use crate::config::HttpSettings;
use crate::crawler::policy::{RequestPolicy, ResourceType};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirects followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// A successfully retrieved resource
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchResult {
    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Failure of a single fetch attempt
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// No response was received (DNS, connect, timeout, redirect loop, body read)
    #[error("network error: {0}")]
    Network(String),

    /// The final response carried a non-2xx status
    #[error("HTTP status {0}")]
    Status(u16),

    /// The request policy refused the request
    #[error("request blocked by policy ({0:?})")]
    Blocked(ResourceType),
}

impl FetchError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Blocked(_))
    }
}

/// One network retrieval of a URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Performs exactly one attempt; redirects are followed
    async fn fetch_page(&self, url: &Url) -> Result<FetchResult, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `settings` - The resolved HTTP settings
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(settings: &HttpSettings) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in &settings.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header {}", name),
        }
    }

    Client::builder()
        .user_agent(settings.user_agent.clone())
        .default_headers(headers)
        .timeout(settings.timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    policy: RequestPolicy,
}

impl HttpPageFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(settings)?,
            policy: RequestPolicy::from_settings(settings),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<FetchResult, FetchError> {
        if let Some(resource) = self.policy.blocked(url) {
            return Err(FetchError::Blocked(resource));
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.bytes().await.map_err(classify_error)?;

        Ok(FetchResult {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

/// Classifies a reqwest error into a short description
fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network("Request timeout".to_string())
    } else if e.is_connect() {
        FetchError::Network("Connection refused".to_string())
    } else if e.is_redirect() {
        FetchError::Network(format!("Redirect error: {}", e))
    } else {
        FetchError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_settings() -> HttpSettings {
        HttpSettings {
            user_agent: "TestMirror/1.0".to_string(),
            timeout: Duration::from_secs(5),
            headers: vec![("X-Test".to_string(), "yes".to_string())],
            block_scripts: false,
            script_hosts: vec![],
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_settings());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let mut settings = create_test_settings();
        settings
            .headers
            .push(("Bad Header".to_string(), "x".to_string()));
        assert!(build_http_client(&settings).is_ok());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(FetchError::Status(500).is_retryable());
        assert!(FetchError::Status(404).is_retryable());
        assert!(FetchError::Network("Request timeout".to_string()).is_retryable());
        assert!(!FetchError::Blocked(ResourceType::Image).is_retryable());
    }

    #[test]
    fn test_fetch_result_text_is_lossy() {
        let result = FetchResult {
            final_url: Url::parse("https://example.com/").unwrap(),
            status_code: 200,
            content_type: "text/html".to_string(),
            body: vec![b'o', b'k', 0xff],
        };
        assert!(result.text().starts_with("ok"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/not-modified"))
            .respond_with(ResponseTemplate::new(304))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dangling"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::new(&create_test_settings()).unwrap();
        let at = |p: &str| Url::parse(&format!("{}{}", server.uri(), p)).unwrap();

        let ok = fetcher.fetch_page(&at("/ok")).await.unwrap();
        assert_eq!(ok.status_code, 200);
        assert_eq!(ok.text(), "fine");

        assert!(matches!(
            fetcher.fetch_page(&at("/not-modified")).await.unwrap_err(),
            FetchError::Status(304)
        ));
        assert!(matches!(
            fetcher.fetch_page(&at("/dangling")).await.unwrap_err(),
            FetchError::Status(302)
        ));
    }

    #[tokio::test]
    async fn test_blocked_request_never_hits_network() {
        let fetcher = HttpPageFetcher::new(&create_test_settings()).unwrap();
        let url = Url::parse("http://127.0.0.1:9/logo.png").unwrap();
        let result = fetcher.fetch_page(&url).await;
        assert!(matches!(
            result.unwrap_err(),
            FetchError::Blocked(ResourceType::Image)
        ));
    }
}
