//! HTTP client for storefront listing and product pages.

mod origin;

use std::time::Duration;

use reqwest::Client;
use saletrack_core::SiteDescriptor;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub use origin::{absolutize_url, canonicalize_url, extract_domain, product_json_url};

/// HTTP client for one storefront.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx responses
/// as typed errors. Transient errors are retried with exponential backoff up
/// to `max_retries` additional attempts; see [`crate::rate_limit`].
pub struct SaleClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_ms * 2^attempt`.
    backoff_base_ms: u64,
}

impl SaleClient {
    /// Creates a `SaleClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_ms: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let timeout = Duration::from_millis(timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from a site's timeout and retry parameters. The
    /// site's request delay doubles as the backoff base.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed.
    pub fn for_site(site: &SiteDescriptor, user_agent: &str) -> Result<Self, ScraperError> {
        Self::new(
            site.timeout_ms,
            user_agent,
            site.max_retries,
            site.request_delay_ms,
        )
    }

    /// Fetches `url` and returns the response body as text, retrying on
    /// transient errors.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: other 4xx (not retried).
    /// - [`ScraperError::RetriesExhausted`]: a 5xx, 429, timeout, or
    ///   connection failure persisted through every retry.
    /// - [`ScraperError::InvalidUrl`]: `url` is not an absolute URL.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScraperError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let referer = parsed.origin().ascii_serialization();

        retry_with_backoff(url, self.max_retries, self.backoff_base_ms, || {
            let url = url.to_owned();
            let referer = referer.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .header(reqwest::header::REFERER, &referer)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);

                    return Err(ScraperError::RateLimited {
                        domain: extract_domain(&url),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
