use std::time::Duration;
use thiserror::Error;

/// Reasons a feed fetch produced no data.
///
/// These never leave a rate source; they are logged and reported to callers
/// as [`crate::core::Rates::Unavailable`].
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("rate limited: at most one request every {interval:?}")]
    RateLimited { interval: Duration },

    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed feed: {0}")]
    MalformedFeed(String),
}
