//! Failure taxonomy for upstream fetches.
//!
//! There is no partial-data variant: a response that is missing some
//! fields is still a success, with the missing fields defaulted one by one.

use reqwest::StatusCode;
use thiserror::Error;

/// Uniform failure signal returned by every Fetcher call.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// Network error, timeout, a 5xx status or a 429 throttle.
    #[error("transport failure for {url}: {reason}")]
    Transport { url: String, reason: String },

    /// A 4xx rejection, a non-JSON body, or a body of the wrong top-level shape.
    #[error("unexpected upstream format for {url}: {reason}")]
    UpstreamFormat { url: String, reason: String },

    /// The upstream circuit breaker refused the call without contacting the API.
    #[error("upstream circuit breaker '{name}' is open")]
    CircuitOpen { name: String },
}

impl FetchFailure {
    pub fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        FetchFailure::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn format(url: impl Into<String>, reason: impl ToString) -> Self {
        FetchFailure::UpstreamFormat {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that never reached a parseable response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchFailure::Transport { .. } | FetchFailure::CircuitOpen { .. }
        )
    }
}

impl FetchFailure {
    /// Failure for a non-success HTTP status, `None` on success.
    ///
    /// 5xx and 429 mean the upstream is struggling and count as transport.
    /// Any other 4xx is a definite answer about the request itself (an
    /// unknown player id, say) and is reported as a format failure, so it
    /// never trips the breaker.
    pub fn from_status(url: &str, status: StatusCode) -> Option<Self> {
        if status.is_success() {
            None
        } else if status == StatusCode::TOO_MANY_REQUESTS || !status.is_client_error() {
            Some(FetchFailure::transport(url, format!("HTTP {}", status)))
        } else {
            Some(FetchFailure::format(url, format!("HTTP {}", status)))
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        if err.is_decode() {
            FetchFailure::format(url, err)
        } else {
            FetchFailure::transport(url, err)
        }
    }
}
