//! Core types and abstractions

pub mod config;
pub mod error;
pub mod limiter;
pub mod log;
pub mod rates;
pub mod source;

// Re-export main types for cleaner imports
pub use error::FeedError;
pub use limiter::RateLimiter;
pub use rates::{CurrencyRecord, RateSnapshot, Rates, Selector};
pub use source::RateSource;
