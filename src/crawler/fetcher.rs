//! HTTP fetcher implementation
//!
//! This module performs single page retrievals for the crawler:
//! - Building the shared HTTP client with a browser-like user agent
//! - Attaching per-site request headers
//! - Following redirects up to a small cap and reporting the final URL
//! - Bounding every fetch by a timeout
//! - Error classification
//!
//! Concurrency and pacing are imposed by the caller.

use crate::state::PageState;
use crate::{ConfigError, FetchError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for one fetch
pub const MAX_REDIRECTS: usize = 5;

/// Connect timeout used when the request timeout is longer
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct PageContent {
    /// HTTP status code
    pub status: u16,
    /// Final URL after redirects
    pub final_url: Url,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Page body
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - User agent sent with every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use shelf_ripple::config::DEFAULT_USER_AGENT;
/// use shelf_ripple::crawler::build_http_client;
///
/// let client = build_http_client(DEFAULT_USER_AGENT).unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves pages for one domain
///
/// Cloning is cheap: the underlying client and its connection pool are shared.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    headers: HeaderMap,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            headers: HeaderMap::new(),
        }
    }

    /// Returns a fetcher that also sends the given headers
    pub fn with_headers(&self, headers: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut map = self.headers.clone();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConfigError::Validation(format!("header '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ConfigError::Validation(format!("header '{}': {}", name, e)))?;
            map.insert(name, value);
        }
        Ok(Self {
            client: self.client.clone(),
            headers: map,
        })
    }

    /// Fetches a URL
    ///
    /// # Flow
    ///
    /// 1. Send GET with the configured headers; redirects are followed up to
    ///    [`MAX_REDIRECTS`]
    /// 2. Status >= 400 → `FetchError::Http`
    /// 3. Read the body as text
    ///
    /// The whole call, body included, never takes longer than `timeout`.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `timeout` - Upper bound for the whole fetch
    ///
    /// # Returns
    ///
    /// * `Ok(PageContent)` - Response with its effective (post-redirect) URL
    /// * `Err(FetchError)` - Timeout, connection, HTTP or redirect failure
    pub async fn fetch(&self, url: &Url, timeout: Duration) -> Result<PageContent, FetchError> {
        match tokio::time::timeout(timeout, self.fetch_inner(url, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    async fn fetch_inner(&self, url: &Url, timeout: Duration) -> Result<PageContent, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .headers(self.headers.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(PageContent {
            status: status.as_u16(),
            final_url,
            content_type,
            body,
        })
    }
}

/// Maps a reqwest error onto the crawler's fetch error kinds
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_redirect() {
        FetchError::RedirectLimit { url }
    } else if error.is_body() || error.is_decode() {
        FetchError::Body {
            url,
            message: error.to_string(),
        }
    } else {
        FetchError::Connection {
            url,
            message: error.to_string(),
        }
    }
}

impl FetchError {
    /// The page state a failed fetch is recorded as
    pub fn page_state(&self) -> PageState {
        match self {
            Self::Timeout { .. } => PageState::TimedOut,
            Self::Connection { .. } => PageState::Unreachable,
            Self::Http { status, .. } => PageState::from_status(*status),
            Self::RedirectLimit { .. } | Self::Body { .. } => PageState::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_fetcher() -> Fetcher {
        Fetcher::new(build_http_client(DEFAULT_USER_AGENT).unwrap())
    }

    fn url_for(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(DEFAULT_USER_AGENT).is_ok());
    }

    #[test]
    fn test_page_state_mapping() {
        let url = "https://shop.example/".to_string();
        assert_eq!(
            FetchError::Timeout { url: url.clone() }.page_state(),
            PageState::TimedOut
        );
        assert_eq!(
            FetchError::Http {
                url: url.clone(),
                status: 404
            }
            .page_state(),
            PageState::DeadLink
        );
        assert_eq!(
            FetchError::Http {
                url: url.clone(),
                status: 503
            }
            .page_state(),
            PageState::HttpError
        );
        assert_eq!(
            FetchError::Connection {
                url: url.clone(),
                message: String::new()
            }
            .page_state(),
            PageState::Unreachable
        );
        assert_eq!(
            FetchError::RedirectLimit { url }.page_state(),
            PageState::Failed
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;

        let page = create_test_fetcher()
            .fetch(&url_for(&server, "/"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<html></html>");
        assert!(page.content_type.unwrap().starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = create_test_fetcher()
            .fetch(&url_for(&server, "/missing"), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let started = std::time::Instant::now();
        let err = create_test_fetcher()
            .fetch(&url_for(&server, "/slow"), Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("moved", "text/html"))
            .mount(&server)
            .await;

        let page = create_test_fetcher()
            .fetch(&url_for(&server, "/old"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.final_url.path(), "/new");
        assert_eq!(page.body, "moved");
    }

    #[tokio::test]
    async fn test_fetch_redirect_loop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
            .mount(&server)
            .await;

        let err = create_test_fetcher()
            .fetch(&url_for(&server, "/loop"), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::RedirectLimit { .. }));
    }

    #[tokio::test]
    async fn test_fetch_sends_site_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("accept-language", "en-IN"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/html"))
            .mount(&server)
            .await;

        let headers = BTreeMap::from([("accept-language".to_string(), "en-IN".to_string())]);
        let fetcher = create_test_fetcher().with_headers(&headers).unwrap();
        let page = fetcher
            .fetch(&url_for(&server, "/"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.body, "ok");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let server = MockServer::builder().start().await;
        let url = url_for(&server, "/");
        drop(server);

        let err = create_test_fetcher()
            .fetch(&url, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Connection { .. }));
    }
}
