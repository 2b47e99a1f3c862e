use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("giving up on {url} after {attempts} attempts: {reason}")]
    RetriesExhausted {
        url: String,
        reason: String,
        attempts: u32,
    },

    #[error("run deadline of {deadline_secs}s exceeded while fetching {url}")]
    DeadlineExceeded { url: String, deadline_secs: u64 },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid CSS selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ScraperError {
    /// `true` when the target site could not be reached at all, as opposed
    /// to a configuration problem on our side.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_)
                | ScraperError::RateLimited { .. }
                | ScraperError::NotFound { .. }
                | ScraperError::UnexpectedStatus { .. }
                | ScraperError::RetriesExhausted { .. }
                | ScraperError::DeadlineExceeded { .. }
        )
    }
}

/// Why an embedded variant literal could not be decoded.
///
/// Never leaves the decoder: callers receive an empty variant list and the
/// reason is logged.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no variant marker found")]
    MissingMarker,

    #[error("literal starting at byte {start} is not terminated")]
    Unterminated { start: usize },

    #[error("literal is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("literal has no variant list")]
    NoVariantList,
}

/// No source produced a usable sale price; the product is left out of the report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no sale price could be resolved for \"{name}\"")]
pub struct PriceUnresolvable {
    pub name: String,
}
