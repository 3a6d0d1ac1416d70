use crate::url::matcher::same_site;
use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use shelf_ripple::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// A domain to crawl together with its seed (homepage) URL
///
/// Created once from user input and never mutated afterwards. Input may be a
/// bare host (`shop.example`, seeded over HTTPS) or carry an explicit scheme
/// and port (`http://127.0.0.1:8080`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    domain: String,
    homepage: Url,
}

impl CrawlTarget {
    /// Parses a domain string into a crawl target
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf_ripple::url::CrawlTarget;
    ///
    /// let target = CrawlTarget::parse("Shop.Example").unwrap();
    /// assert_eq!(target.domain(), "shop.example");
    /// assert_eq!(target.homepage().as_str(), "https://shop.example/");
    /// ```
    pub fn parse(input: &str) -> UrlResult<Self> {
        let trimmed = input.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(UrlError::Malformed("empty domain".to_string()));
        }

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else if trimmed.contains("://") {
            return Err(UrlError::InvalidScheme(trimmed.to_string()));
        } else {
            format!("https://{}", trimmed)
        };

        let mut homepage =
            Url::parse(&with_scheme).map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;
        let host = extract_domain(&homepage).ok_or(UrlError::MissingDomain)?;

        if homepage.path() != "/" || homepage.query().is_some() {
            return Err(UrlError::Malformed(format!(
                "expected a bare domain, got '{}'",
                input
            )));
        }
        homepage.set_fragment(None);

        let domain = match homepage.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        };

        Ok(Self { domain, homepage })
    }

    /// The lowercase domain, including an explicit port when one was given
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The canonical homepage URL; used as the seed and as the report key
    pub fn homepage(&self) -> &Url {
        &self.homepage
    }

    /// Scheme every in-scope URL is rewritten to
    pub fn scheme(&self) -> &str {
        self.homepage.scheme()
    }

    /// Host every in-scope URL is rewritten to
    pub fn host(&self) -> &str {
        self.homepage.host_str().unwrap_or_default()
    }

    /// Returns true if the URL belongs to this target
    ///
    /// Hosts that differ only by a leading `www.` are the same site. An
    /// explicit non-default port must match.
    pub fn in_scope(&self, url: &Url) -> bool {
        let Some(host) = extract_domain(url) else {
            return false;
        };
        same_site(self.host(), &host) && url.port() == self.homepage.port()
    }
}
